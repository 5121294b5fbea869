//! Per-turn conversation core: prompt building, completion, action
//! extraction and dispatch, plus the speech-to-text front end.

pub mod conversation;
pub mod dispatch;
pub mod extract;
pub mod i18n;
pub mod policy;
pub mod prompt;
pub mod stt;

pub use conversation::{ConversationAgent, ConversationInput, ConversationResult, TurnError};
pub use dispatch::{Dispatch, DispatchOutcome, Dispatcher};
pub use extract::{extract_json, ActionRequest};
pub use policy::{ActionPolicy, Verdict};
pub use prompt::PromptBuilder;
pub use stt::{SpeechMetadata, SpeechToText};
