//! In-memory session store.
//!
//! Each conversation id owns its own mutex-guarded turn list. The outer map
//! lock is held only long enough to find or create that slot, so turns for
//! unrelated conversations never wait on each other.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use mc_domain::message::Message;
use mc_domain::trace::TraceEvent;

/// Default cap: 20 user/assistant exchanges.
pub const DEFAULT_MAX_TURNS: usize = 40;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Ordered, capped turn history keyed by conversation id.
///
/// The system prompt is never stored; it is rebuilt on every turn.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Prior turns in insertion order. Unknown ids yield an empty history.
    async fn history(&self, conversation_id: &str) -> Vec<Message>;

    /// Append turns, then trim the oldest so the cap holds.
    async fn append(&self, conversation_id: &str, turns: Vec<Message>);

    /// Record one completed exchange.
    async fn record_exchange(&self, conversation_id: &str, user: Message, assistant: Message) {
        self.append(conversation_id, vec![user, assistant]).await;
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

type Slot = Arc<Mutex<VecDeque<Message>>>;

/// Process-lifetime store. Nothing survives a restart.
pub struct MemorySessionStore {
    max_turns: usize,
    sessions: RwLock<HashMap<String, Slot>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::with_max_turns(DEFAULT_MAX_TURNS)
    }

    /// Custom cap. Rounded down to an even number (minimum 2) so trimming
    /// always removes whole exchanges.
    pub fn with_max_turns(max_turns: usize) -> Self {
        let max_turns = (max_turns - max_turns % 2).max(2);
        Self {
            max_turns,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Number of stored turns for a conversation.
    pub fn len(&self, conversation_id: &str) -> usize {
        self.slot(conversation_id).map_or(0, |s| s.lock().len())
    }

    /// Number of tracked conversations (for monitoring).
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Forget a conversation entirely. Returns true if it existed.
    ///
    /// An append that already holds the old slot lands before the clear
    /// and is discarded with it; later appends start a fresh history.
    pub fn clear(&self, conversation_id: &str) -> bool {
        let existed = self.sessions.write().remove(conversation_id).is_some();
        if existed {
            tracing::debug!(conversation_id, "conversation cleared");
        }
        existed
    }

    fn slot(&self, conversation_id: &str) -> Option<Slot> {
        self.sessions.read().get(conversation_id).cloned()
    }

    fn slot_or_create(&self, conversation_id: &str) -> Slot {
        // Fast path: slot already exists.
        if let Some(slot) = self.slot(conversation_id) {
            return slot;
        }

        // Slow path: create it.
        self.sessions
            .write()
            .entry(conversation_id.to_owned())
            .or_default()
            .clone()
    }

    /// Append into `slot` if it is still the one registered for the id.
    ///
    /// Hands the turns back when `clear` removed the slot after it was
    /// looked up. The slot lock is taken before the map lock, and `clear`
    /// never takes a slot lock, so the two cannot deadlock.
    fn append_to(&self, conversation_id: &str, slot: &Slot, turns: Vec<Message>) -> Result<(), Vec<Message>> {
        let mut turns_guard = slot.lock();
        let current = self
            .slot(conversation_id)
            .is_some_and(|registered| Arc::ptr_eq(&registered, slot));
        if !current {
            return Err(turns);
        }
        turns_guard.extend(turns);

        let len = turns_guard.len();
        if len <= self.max_turns {
            return Ok(());
        }

        // Round up so an odd overflow still drops a whole exchange.
        let mut dropped = len - self.max_turns;
        dropped += dropped % 2;
        turns_guard.drain(..dropped.min(len));
        let retained = turns_guard.len();
        drop(turns_guard);

        TraceEvent::SessionTrimmed {
            conversation_id: conversation_id.to_owned(),
            dropped,
            retained,
        }
        .emit();
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn history(&self, conversation_id: &str) -> Vec<Message> {
        match self.slot(conversation_id) {
            Some(slot) => slot.lock().iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    async fn append(&self, conversation_id: &str, turns: Vec<Message>) {
        if turns.is_empty() {
            return;
        }

        let mut turns = turns;
        loop {
            let slot = self.slot_or_create(conversation_id);
            match self.append_to(conversation_id, &slot, turns) {
                Ok(()) => return,
                Err(returned) => {
                    tracing::debug!(conversation_id, "slot cleared during append; retrying");
                    turns = returned;
                }
            }
        }
    }
}
