use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mistral API connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const MISTRAL_API_BASE: &str = "https://api.mistral.ai/v1";
pub const STT_MODEL: &str = "voxtral-mini-latest";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Budget for chat and agent completions.
    #[serde(default = "d_30000u")]
    pub chat_timeout_ms: u64,
    /// Budget for audio transcription uploads.
    #[serde(default = "d_60000u")]
    pub transcription_timeout_ms: u64,
    /// Budget for the startup key check.
    #[serde(default = "d_10000u")]
    pub check_timeout_ms: u64,
    #[serde(default = "d_stt_model")]
    pub stt_model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            auth: AuthConfig::default(),
            chat_timeout_ms: 30_000,
            transcription_timeout_ms: 60_000,
            check_timeout_ms: 10_000,
            stt_model: d_stt_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Env var containing the key.
    #[serde(default = "d_key_env")]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer env).
    #[serde(default)]
    pub key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            env: d_key_env(),
            key: None,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    MISTRAL_API_BASE.into()
}
fn d_stt_model() -> String {
    STT_MODEL.into()
}
fn d_key_env() -> Option<String> {
    Some("MISTRAL_API_KEY".into())
}
fn d_30000u() -> u64 {
    30_000
}
fn d_60000u() -> u64 {
    60_000
}
fn d_10000u() -> u64 {
    10_000
}
