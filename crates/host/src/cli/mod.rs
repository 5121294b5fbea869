pub mod chat;
pub mod check;
pub mod config;
pub mod run;
pub mod transcribe;

use clap::{Parser, Subcommand};

/// mistral-conversation: a Mistral AI voice assistant core with a
/// simulated smart home.
#[derive(Debug, Parser)]
#[command(name = "mistral-conversation", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive conversation (default when no subcommand is given).
    Chat {
        /// Conversation id to continue (a new one is generated otherwise).
        #[arg(long)]
        conversation: Option<String>,
        /// Language tag of the user (e.g. "nl", "de-DE").
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Send a single utterance and print the reply.
    Run {
        /// The utterance to send.
        message: String,
        /// Conversation id to continue.
        #[arg(long)]
        conversation: Option<String>,
        /// Language tag of the user.
        #[arg(long, default_value = "en")]
        language: String,
        /// Output the full turn result as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Transcribe a WAV file with Voxtral.
    Transcribe {
        /// Path to a PCM WAV file.
        path: String,
        /// Language hint, overriding `options.stt_language`.
        #[arg(long)]
        language: Option<String>,
    },
    /// Validate the config and verify the API key.
    Check,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `MC_CONFIG` (or
/// `config.toml` by default).  Returns the parsed [`Config`] and the
/// path that was used.
///
/// [`Config`]: mc_domain::config::Config
pub fn load_config() -> anyhow::Result<(mc_domain::config::Config, String)> {
    let config_path = std::env::var("MC_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

/// Parse a config file; a missing file yields the defaults.
pub fn load_config_from(config_path: &str) -> anyhow::Result<mc_domain::config::Config> {
    if !std::path::Path::new(config_path).exists() {
        return Ok(mc_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))
}
