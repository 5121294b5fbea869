//! The per-turn pipeline.
//!
//! ```text
//! options → prompt → completion ─┬─ error ───────────────→ result (history untouched)
//!                                ├─ cancelled ───────────→ result (history untouched)
//!                                └─ reply → dispatch → history append → result
//! ```
//!
//! Exactly one completion request is made per turn. Options are re-read at
//! the start of every turn so edits apply without a restart.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use mc_domain::config::{ConversationMode, ConversationOptions, OptionsSource};
use mc_domain::error::ErrorKind;
use mc_domain::home::{AuthContext, ExposedEntities, HomeActions};
use mc_domain::message::Message;
use mc_providers::{CompletionClient, CompletionRequest, CompletionTarget};
use mc_sessions::{resolve_conversation_id, SessionStore};

use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::i18n::{self, Lang};
use crate::policy::ActionPolicy;
use crate::prompt::PromptBuilder;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn input / output
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One user utterance.
#[derive(Debug, Clone, Default)]
pub struct ConversationInput {
    pub text: String,
    /// Continue an existing conversation; `None` or blank starts a new one.
    pub conversation_id: Option<String>,
    /// BCP-47 tag of the user's language. Empty means English.
    pub language: String,
    pub auth: AuthContext,
}

impl ConversationInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Why a turn produced no model reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum TurnError {
    /// The completion request failed.
    Request(ErrorKind),
    /// Agent mode without an agent id.
    NoAgentId,
    /// Cancelled while the request was in flight.
    Cancelled,
}

/// What the user hears, plus how the turn went.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationResult {
    pub speech: String,
    pub conversation_id: String,
    pub error: Option<TurnError>,
    /// `None` when the turn never got a reply.
    pub action: Option<DispatchOutcome>,
}

impl ConversationResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    fn failed(conversation_id: String, speech: impl Into<String>, error: TurnError) -> Self {
        Self {
            speech: speech.into(),
            conversation_id,
            error: Some(error),
            action: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Conversation agent shared by every turn. Cheap to call concurrently for
/// different conversation ids.
pub struct ConversationAgent {
    client: Arc<dyn CompletionClient>,
    sessions: Arc<dyn SessionStore>,
    options: Arc<dyn OptionsSource>,
    entities: Arc<dyn ExposedEntities>,
    dispatcher: Dispatcher,
    prompts: PromptBuilder,
    location_name: String,
    time_zone: Tz,
}

impl ConversationAgent {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        sessions: Arc<dyn SessionStore>,
        options: Arc<dyn OptionsSource>,
        home: Arc<dyn HomeActions>,
        entities: Arc<dyn ExposedEntities>,
    ) -> Self {
        Self {
            client,
            sessions,
            options,
            entities,
            dispatcher: Dispatcher::new(home),
            prompts: PromptBuilder::new(),
            location_name: "Home".into(),
            time_zone: Tz::UTC,
        }
    }

    /// Location name and time zone used when rendering the prompt.
    pub fn with_location(mut self, name: impl Into<String>, time_zone: Tz) -> Self {
        self.location_name = name.into();
        self.time_zone = time_zone;
        self
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.time_zone)
    }

    /// Run one turn. Never fails: errors become a localized spoken reply
    /// with [`ConversationResult::error`] set.
    pub async fn process(
        &self,
        input: ConversationInput,
        cancel: &CancellationToken,
    ) -> ConversationResult {
        let conversation_id = resolve_conversation_id(input.conversation_id.as_deref());
        let opts = self.options.options();

        let span = tracing::info_span!(
            "turn",
            conversation_id = %conversation_id,
            mode = opts.mode.as_str(),
            language = Lang::from_tag(&input.language).code(),
        );

        self.run_turn(input, conversation_id, opts, cancel)
            .instrument(span)
            .await
    }

    async fn run_turn(
        &self,
        input: ConversationInput,
        conversation_id: String,
        opts: ConversationOptions,
        cancel: &CancellationToken,
    ) -> ConversationResult {
        let lang = Lang::from_tag(&input.language);
        let history = self.sessions.history(&conversation_id).await;

        let Some(request) = self.build_request(&opts, history, &input.text) else {
            tracing::warn!("agent mode selected but no agent id configured");
            return ConversationResult::failed(
                conversation_id,
                i18n::no_agent_id(lang),
                TurnError::NoAgentId,
            );
        };

        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("turn cancelled while waiting for Mistral AI");
                return ConversationResult::failed(
                    conversation_id,
                    i18n::cancelled(lang),
                    TurnError::Cancelled,
                );
            }
            result = self.client.complete(&request) => result,
        };

        let raw_reply = match reply {
            Ok(resp) => {
                if resp.is_truncated() {
                    tracing::warn!(model = %resp.model, "reply cut off at the token limit");
                } else {
                    tracing::debug!(
                        model = %resp.model,
                        finish_reason = resp.finish_reason.as_deref().unwrap_or("none"),
                        "reply received"
                    );
                }
                resp.content
            }
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "Mistral AI API error");
                return ConversationResult::failed(
                    conversation_id,
                    i18n::api_error(lang, &e.to_string()),
                    TurnError::Request(e.kind()),
                );
            }
        };

        let dispatched = self
            .dispatcher
            .dispatch(
                &raw_reply,
                opts.control_ha,
                ActionPolicy::from_options(opts.strict_homeassistant_domain),
                lang,
                &input.auth,
            )
            .await;

        // History keeps the raw reply, not the spoken confirmation.
        self.sessions
            .record_exchange(
                &conversation_id,
                Message::user(input.text),
                Message::assistant(raw_reply),
            )
            .await;

        ConversationResult {
            speech: dispatched.speech,
            conversation_id,
            error: None,
            action: Some(dispatched.outcome),
        }
    }

    /// `None` only in agent mode without an agent id.
    fn build_request(
        &self,
        opts: &ConversationOptions,
        history: Vec<Message>,
        user_text: &str,
    ) -> Option<CompletionRequest> {
        match opts.mode {
            ConversationMode::Model => {
                let entities = opts.control_ha.then(|| self.entities.exposed_entities());
                let system = self.prompts.build(
                    &opts.prompt,
                    &self.location_name,
                    self.now(),
                    entities.as_deref(),
                );

                let mut messages = Vec::with_capacity(history.len() + 2);
                messages.push(Message::system(system));
                messages.extend(history);
                messages.push(Message::user(user_text));

                Some(CompletionRequest {
                    target: CompletionTarget::Model {
                        model: opts.model.clone(),
                        max_tokens: opts.clamped_max_tokens(),
                        temperature: opts.clamped_temperature(),
                    },
                    messages,
                })
            }
            ConversationMode::Agent => {
                let agent_id = opts.agent_id.trim();
                if agent_id.is_empty() {
                    return None;
                }

                let mut messages = history;
                messages.push(Message::user(user_text));

                Some(CompletionRequest {
                    target: CompletionTarget::Agent {
                        agent_id: agent_id.to_string(),
                    },
                    messages,
                })
            }
        }
    }
}
