use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mc_host::cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to chat when no subcommand is given.
        None => {
            init_cli_tracing();
            let (config, _) = mc_host::cli::load_config()?;
            mc_host::cli::chat::chat(Arc::new(config), None, "en".into()).await
        }
        Some(Command::Chat { conversation, language }) => {
            init_cli_tracing();
            let (config, _) = mc_host::cli::load_config()?;
            mc_host::cli::chat::chat(Arc::new(config), conversation, language).await
        }
        Some(Command::Run { message, conversation, language, json }) => {
            init_cli_tracing();
            let (config, _) = mc_host::cli::load_config()?;
            let code =
                mc_host::cli::run::run(Arc::new(config), message, conversation, language, json)
                    .await?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Some(Command::Transcribe { path, language }) => {
            init_cli_tracing();
            let (config, _) = mc_host::cli::load_config()?;
            mc_host::cli::transcribe::transcribe(Arc::new(config), path, language).await
        }
        Some(Command::Check) => {
            init_cli_tracing();
            let (config, config_path) = mc_host::cli::load_config()?;
            let passed = mc_host::cli::check::run(&config, &config_path).await?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = mc_host::cli::load_config()?;
            let valid = mc_host::cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = mc_host::cli::load_config()?;
            mc_host::cli::config::show(&config);
            Ok(())
        }
        Some(Command::Version) => {
            println!("mistral-conversation {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Human-readable tracing on stderr; quiet unless `RUST_LOG` says otherwise.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
