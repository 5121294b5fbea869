mod api;
mod home;
mod options;

pub use api::*;
pub use home::*;
pub use options::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub options: ConversationOptions,
    #[serde(default)]
    pub home: HomeConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.api.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "api.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        }

        if self.api.auth.key.is_none() && self.api.auth.env.is_none() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "api.auth".into(),
                message: "set either 'key' or 'env'".into(),
            });
        }

        for (field, ms) in [
            ("api.chat_timeout_ms", self.api.chat_timeout_ms),
            ("api.transcription_timeout_ms", self.api.transcription_timeout_ms),
            ("api.check_timeout_ms", self.api.check_timeout_ms),
        ] {
            if ms == 0 {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: field.into(),
                    message: "timeout must be greater than 0".into(),
                });
            }
        }

        errors.extend(self.options.validate());
        errors
    }
}

impl ConversationOptions {
    /// Range and consistency checks for the options record alone.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.max_tokens) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "options.max_tokens".into(),
                message: format!(
                    "must be between {MIN_MAX_TOKENS} and {MAX_MAX_TOKENS}, got {}",
                    self.max_tokens
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "options.temperature".into(),
                message: format!("must be between 0.0 and 1.0, got {}", self.temperature),
            });
        }

        match self.mode {
            ConversationMode::Agent if self.agent_id.trim().is_empty() => {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Error,
                    field: "options.agent_id".into(),
                    message: "agent mode requires an agent id".into(),
                });
            }
            ConversationMode::Model if !CHAT_MODELS.contains(&self.model.as_str()) => {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: "options.model".into(),
                    message: format!("'{}' is not one of the known chat models", self.model),
                });
            }
            _ => {}
        }

        if self.prompt.trim().is_empty() && self.mode == ConversationMode::Model {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "options.prompt".into(),
                message: "empty prompt template".into(),
            });
        }

        errors
    }
}
