//! `mistral-conversation run`: one-shot execution command.
//!
//! Sends a single utterance through the conversation agent, prints the
//! spoken reply, and exits.  Useful for scripting and quick checks.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use mc_assist::{ConversationInput, ConversationResult};
use mc_domain::config::Config;

use crate::bootstrap::{self, KeyCheck};

/// Execute a single turn and print the reply.
///
/// Returns the process exit code: `0` on success, `1` when the turn
/// ended in an error.
pub async fn run(
    config: Arc<Config>,
    message: String,
    conversation: Option<String>,
    language: String,
    json_output: bool,
) -> anyhow::Result<i32> {
    // One completion per invocation: the key is not pre-verified.
    let state = bootstrap::build_app_state(config, KeyCheck::Skip).await?;

    let mut input = ConversationInput::new(message).with_language(language);
    input.conversation_id = conversation;

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = state.agent.process(input, &cancel).await;
    watcher.abort();

    if json_output {
        println!("{}", render_json(&result)?);
    } else if result.is_error() {
        eprintln!("error: {}", result.speech);
    } else {
        println!("{}", result.speech);
    }

    Ok(if result.is_error() { 1 } else { 0 })
}

fn render_json(result: &ConversationResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
