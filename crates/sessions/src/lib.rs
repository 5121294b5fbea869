//! Conversation history for the Mistral conversation agent.
//!
//! A session maps an opaque conversation id to a short, capped list of prior
//! turns. The store is injected into the orchestrator as a trait object so a
//! persistent or shared implementation can replace the in-memory one.

pub mod conversation_id;
pub mod store;

pub use conversation_id::resolve_conversation_id;
pub use store::{MemorySessionStore, SessionStore, DEFAULT_MAX_TURNS};
