//! AppState construction shared by the `chat`, `run` and `transcribe`
//! commands.

use std::sync::Arc;

use anyhow::Context;
use chrono_tz::Tz;

use mc_assist::{ConversationAgent, SpeechToText};
use mc_domain::config::{Config, ConfigSeverity, LiveOptions};
use mc_domain::error::Error;
use mc_providers::MistralClient;
use mc_sessions::MemorySessionStore;

use crate::home::SimulatedHome;

/// Everything a command needs to run turns.
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<MistralClient>,
    pub sessions: Arc<MemorySessionStore>,
    /// Editable at runtime (the chat REPL's slash commands).
    pub options: Arc<LiveOptions>,
    pub home: Arc<SimulatedHome>,
    pub agent: ConversationAgent,
    pub stt: SpeechToText,
}

/// Whether to verify the API key against `GET /models` while booting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCheck {
    Verify,
    Skip,
}

/// Parse an IANA time zone name, falling back to UTC.
pub fn parse_tz(tz: &str) -> Tz {
    tz.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!(time_zone = tz, "unknown time zone, using UTC");
        Tz::UTC
    })
}

/// Validate config, build the Mistral client and wire the agent.
pub async fn build_app_state(config: Arc<Config>, key_check: KeyCheck) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    // ── Mistral client ───────────────────────────────────────────────
    let client = Arc::new(
        MistralClient::from_config(&config.api).context("initializing Mistral AI client")?,
    );

    if key_check == KeyCheck::Verify {
        match client.check_api_key().await {
            Ok(()) => tracing::info!(base_url = %config.api.base_url, "Mistral AI key verified"),
            Err(e @ Error::Auth(_)) => return Err(e).context("Mistral AI rejected the API key"),
            Err(e) => tracing::warn!(error = %e, "could not verify Mistral AI key"),
        }
    }

    // ── Home, sessions, options ──────────────────────────────────────
    let home = Arc::new(SimulatedHome::from_config(&config.home));
    tracing::info!(entities = config.home.entities.len(), "simulated home ready");

    let sessions = Arc::new(MemorySessionStore::new());
    let options = Arc::new(LiveOptions::new(config.options.clone()));

    let time_zone = config
        .home
        .time_zone
        .as_deref()
        .map_or(Tz::UTC, parse_tz);

    let agent = ConversationAgent::new(
        client.clone(),
        sessions.clone(),
        options.clone(),
        home.clone(),
        home.clone(),
    )
    .with_location(config.home.location_name.clone(), time_zone);

    let stt = SpeechToText::new(client.clone(), options.clone());

    Ok(AppState {
        config,
        client,
        sessions,
        options,
        home,
        agent,
        stt,
    })
}
