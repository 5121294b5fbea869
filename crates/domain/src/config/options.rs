use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation options (the per-turn configuration record)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const DEFAULT_MODEL: &str = "ministral-8b-latest";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const MIN_MAX_TOKENS: u32 = 64;
pub const MAX_MAX_TOKENS: u32 = 8192;

pub const DEFAULT_PROMPT: &str = "You are a helpful voice assistant for a smart home called {{ ha_name }}.\n\
Answer in the same language the user speaks.\n\
Be concise and friendly.\n\
Today is {{ now().strftime('%A, %B %d, %Y') }}.";

/// Chat models offered for selection, fastest instruction-followers first.
pub const CHAT_MODELS: &[&str] = &[
    "ministral-8b-latest",
    "ministral-3b-latest",
    "mistral-small-latest",
    "mistral-large-latest",
    "open-mistral-nemo",
];

/// Where completions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    /// A directly configured model with our own system prompt.
    #[default]
    Model,
    /// A remote Mistral agent that owns its own instructions.
    Agent,
}

impl ConversationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ConversationMode::Model => "model",
            ConversationMode::Agent => "agent",
        }
    }
}

/// Resolved options, read fresh at the start of every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationOptions {
    #[serde(default)]
    pub mode: ConversationMode,
    #[serde(default = "d_model")]
    pub model: String,
    /// Required in agent mode.
    #[serde(default)]
    pub agent_id: String,
    /// System prompt template (Jinja syntax).
    #[serde(default = "d_prompt")]
    pub prompt: String,
    #[serde(default = "d_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    /// Expose entities to the model and dispatch its actions.
    #[serde(default = "d_true")]
    pub control_ha: bool,
    /// Transcription language code; empty means auto-detect.
    #[serde(default)]
    pub stt_language: String,
    /// When set, the `homeassistant` domain is held to its allow-list entry
    /// like every other domain instead of accepting any service.
    #[serde(default)]
    pub strict_homeassistant_domain: bool,
}

impl Default for ConversationOptions {
    fn default() -> Self {
        Self {
            mode: ConversationMode::Model,
            model: d_model(),
            agent_id: String::new(),
            prompt: d_prompt(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            control_ha: true,
            stt_language: String::new(),
            strict_homeassistant_domain: false,
        }
    }
}

impl ConversationOptions {
    /// Temperature clamped to the range the API accepts.
    pub fn clamped_temperature(&self) -> f32 {
        if self.temperature.is_nan() {
            return DEFAULT_TEMPERATURE;
        }
        self.temperature.clamp(0.0, 1.0)
    }

    /// Max tokens clamped to the supported window.
    pub fn clamped_max_tokens(&self) -> u32 {
        self.max_tokens.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS)
    }

    /// Trimmed transcription language hint, `None` for auto-detect.
    pub fn stt_language_hint(&self) -> Option<&str> {
        let code = self.stt_language.trim();
        (!code.is_empty()).then_some(code)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Options source (owned by the host's configuration subsystem)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Read-only access to the current options snapshot.
pub trait OptionsSource: Send + Sync {
    fn options(&self) -> ConversationOptions;
}

impl OptionsSource for ConversationOptions {
    fn options(&self) -> ConversationOptions {
        self.clone()
    }
}

/// Options that can be replaced at runtime; every turn sees the latest value.
#[derive(Debug, Default)]
pub struct LiveOptions {
    inner: RwLock<ConversationOptions>,
}

impl LiveOptions {
    pub fn new(options: ConversationOptions) -> Self {
        Self { inner: RwLock::new(options) }
    }

    /// Apply an in-place edit to the current options.
    pub fn update(&self, f: impl FnOnce(&mut ConversationOptions)) {
        f(&mut self.inner.write());
    }
}

impl OptionsSource for LiveOptions {
    fn options(&self) -> ConversationOptions {
        self.inner.read().clone()
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_model() -> String {
    DEFAULT_MODEL.into()
}
fn d_prompt() -> String {
    DEFAULT_PROMPT.into()
}
fn d_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
fn d_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
fn d_true() -> bool {
    true
}
