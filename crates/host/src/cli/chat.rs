//! `mistral-conversation chat`: interactive REPL command.
//!
//! Opens a readline-based loop that sends each line through the
//! conversation agent and prints the spoken reply.  Slash-commands edit
//! the live options between turns, so mode and model switches apply on
//! the very next utterance.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use mc_assist::{ConversationInput, DispatchOutcome};
use mc_domain::config::{Config, ConversationMode, LiveOptions, CHAT_MODELS};
use mc_sessions::MemorySessionStore;

use crate::bootstrap::{self, AppState, KeyCheck};
use crate::home::SimulatedHome;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-REPL state that is not part of the conversation options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSession {
    /// `None` until the first turn assigns one.
    pub conversation_id: Option<String>,
    pub language: String,
}

/// Run the interactive chat REPL.
pub async fn chat(
    config: Arc<Config>,
    conversation: Option<String>,
    language: String,
) -> anyhow::Result<()> {
    // 1. Boot (verifying the key so a bad one fails before the prompt).
    let state = bootstrap::build_app_state(config, KeyCheck::Verify).await?;

    // 2. Initialize rustyline editor with persistent history.
    let history_path = dirs::home_dir()
        .unwrap_or_default()
        .join(".mistral-conversation")
        .join("chat_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    let mut session = ChatSession {
        conversation_id: conversation.filter(|c| !c.trim().is_empty()),
        language,
    };

    // 3. Welcome message on stderr (keep stdout clean for replies).
    eprintln!("Mistral conversation: {}", state.config.home.location_name);
    eprintln!("{}  |  Type /help for commands, Ctrl+D to exit", describe_mode(&state.options));
    eprintln!();

    // 4. REPL loop.
    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(&line).ok();

                // ── Slash commands ────────────────────────────────
                if trimmed.starts_with('/') {
                    let outcome =
                        handle_slash_command(trimmed, &mut session, &state.options, &state.sessions);
                    match outcome {
                        SlashOutcome::Exit => break,
                        SlashOutcome::Devices => print_devices(&state.home),
                        SlashOutcome::Continue => {}
                    }
                    continue;
                }

                // ── Utterance → turn ─────────────────────────────
                send_message(&state, &mut session, trimmed).await;
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    rl.save_history(&history_path).ok();
    eprintln!("Goodbye!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashOutcome {
    Continue,
    Devices,
    Exit,
}

/// Process a slash command.
pub fn handle_slash_command(
    input: &str,
    session: &mut ChatSession,
    options: &LiveOptions,
    sessions: &MemorySessionStore,
) -> SlashOutcome {
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match cmd {
        "/exit" | "/quit" => return SlashOutcome::Exit,

        "/devices" => return SlashOutcome::Devices,

        "/mode" => match arg {
            Some("model") => {
                options.update(|o| o.mode = ConversationMode::Model);
                eprintln!("{}", describe_mode(options));
            }
            Some("agent") => {
                options.update(|o| o.mode = ConversationMode::Agent);
                eprintln!("{}", describe_mode(options));
            }
            _ => {
                eprintln!("{}", describe_mode(options));
                eprintln!("Usage: /mode <model|agent>");
            }
        },

        "/model" => {
            if let Some(name) = arg {
                options.update(|o| o.model = name.to_string());
                eprintln!("Model set to: {name}");
            } else {
                eprintln!("Current model: {}", options_snapshot(options).model);
                eprintln!("Known models: {}", CHAT_MODELS.join(", "));
                eprintln!("Usage: /model <name>");
            }
        }

        "/agent" => {
            if let Some(id) = arg {
                options.update(|o| o.agent_id = id.to_string());
                eprintln!("Agent id set to: {id}");
            } else {
                let current = options_snapshot(options).agent_id;
                let current = if current.is_empty() { "(none)".to_string() } else { current };
                eprintln!("Current agent id: {current}");
                eprintln!("Usage: /agent <agent-id>");
            }
        }

        "/control" => match arg {
            Some("on") => {
                options.update(|o| o.control_ha = true);
                eprintln!("Device control enabled");
            }
            Some("off") => {
                options.update(|o| o.control_ha = false);
                eprintln!("Device control disabled");
            }
            _ => {
                let on = options_snapshot(options).control_ha;
                eprintln!("Device control: {}", if on { "on" } else { "off" });
                eprintln!("Usage: /control <on|off>");
            }
        },

        "/lang" => {
            if let Some(tag) = arg {
                session.language = tag.to_string();
                eprintln!("Language set to: {tag}");
            } else {
                eprintln!("Current language: {}", session.language);
                eprintln!("Usage: /lang <tag>");
            }
        }

        "/session" => {
            if let Some(id) = arg {
                session.conversation_id = Some(id.to_string());
                eprintln!("Conversation switched to: {id}");
            } else {
                let current = session.conversation_id.as_deref().unwrap_or("(new)");
                eprintln!("Current conversation: {current}");
                eprintln!("Usage: /session <id>");
            }
        }

        "/reset" => {
            if let Some(id) = session.conversation_id.take() {
                sessions.clear(&id);
            }
            eprintln!("Conversation reset. The next message starts a new one.");
        }

        "/help" => {
            eprintln!("Commands:");
            eprintln!("  /mode <model|agent>  Switch where replies come from");
            eprintln!("  /model <name>        Set the chat model");
            eprintln!("  /agent <id>          Set the Mistral agent id");
            eprintln!("  /control <on|off>    Toggle device control");
            eprintln!("  /lang <tag>          Set the conversation language");
            eprintln!("  /session <id>        Continue a conversation by id");
            eprintln!("  /reset               Forget this conversation");
            eprintln!("  /devices             List simulated devices");
            eprintln!("  /exit, /quit         Exit the chat");
            eprintln!("  /help                Show this help");
        }

        other => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }

    SlashOutcome::Continue
}

fn options_snapshot(options: &LiveOptions) -> mc_domain::config::ConversationOptions {
    use mc_domain::config::OptionsSource;
    options.options()
}

fn describe_mode(options: &LiveOptions) -> String {
    let opts = options_snapshot(options);
    match opts.mode {
        ConversationMode::Model => format!("Mode: model ({})", opts.model),
        ConversationMode::Agent if opts.agent_id.is_empty() => "Mode: agent (no agent id set)".into(),
        ConversationMode::Agent => format!("Mode: agent ({})", opts.agent_id),
    }
}

fn print_devices(home: &SimulatedHome) {
    let entities = home.all_entities();
    if entities.is_empty() {
        eprintln!("No devices configured (add [[home.entities]] to the config).");
        return;
    }
    for (entity, exposed) in entities {
        let marker = if exposed { ' ' } else { '-' };
        eprintln!(
            " {marker} {:<28} {:<20} {}",
            entity.entity_id,
            entity.display_name(),
            entity.state
        );
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn execution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run one turn; Ctrl+C while waiting cancels the request.
async fn send_message(state: &AppState, session: &mut ChatSession, text: &str) {
    let mut input = ConversationInput::new(text).with_language(session.language.clone());
    input.conversation_id = session.conversation_id.clone();

    let cancel = CancellationToken::new();
    let turn = state.agent.process(input, &cancel);
    tokio::pin!(turn);

    let result = tokio::select! {
        result = &mut turn => result,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            turn.await
        }
    };

    session.conversation_id = Some(result.conversation_id.clone());

    if result.is_error() {
        eprintln!("\x1B[31m{}\x1B[0m", result.speech);
    } else {
        println!("{}", result.speech);
    }
    if let Some(action) = &result.action {
        if let Some(line) = describe_action(action) {
            eprintln!("\x1B[2m{line}\x1B[0m");
        }
    }
    println!();
}

fn describe_action(outcome: &DispatchOutcome) -> Option<String> {
    match outcome {
        DispatchOutcome::PassThrough => None,
        DispatchOutcome::Blocked { domain, service } => Some(format!("[blocked: {domain}.{service}]")),
        DispatchOutcome::Executed(call) => {
            Some(format!("[called: {} on {}]", call.qualified_name(), call.entity_id))
        }
        DispatchOutcome::Failed { call, detail } => {
            Some(format!("[failed: {} ({detail})]", call.qualified_name()))
        }
        DispatchOutcome::Unexpected { call } => {
            Some(format!("[unexpected error: {}]", call.qualified_name()))
        }
    }
}
