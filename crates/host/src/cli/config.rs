use mc_assist::PromptBuilder;
use mc_domain::config::{Config, ConfigSeverity};

use crate::bootstrap::parse_tz;

/// Parse and validate the config, printing any issues.
///
/// Exits with code 0 when valid, code 1 when errors are found. A prompt
/// template that fails to render is reported as a warning: turns still run
/// with the raw template text.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let found = config.validate();
    let error_count = found
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let mut issues: Vec<String> = found.iter().map(ToString::to_string).collect();

    if let Some(warning) = template_warning(config) {
        issues.push(warning);
    }

    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    for issue in &issues {
        println!("{issue}");
    }

    println!(
        "\n{} error(s), {} warning(s) in {config_path}",
        error_count,
        issues.len() - error_count,
    );

    error_count == 0
}

/// Render the prompt template once against the configured location.
pub fn template_warning(config: &Config) -> Option<String> {
    let tz = config
        .home
        .time_zone
        .as_deref()
        .map_or(chrono_tz::Tz::UTC, parse_tz);
    let now = chrono::Utc::now().with_timezone(&tz);
    PromptBuilder::new()
        .render(&config.options.prompt, &config.home.location_name, now)
        .err()
        .map(|e| format!("[WARN] options.prompt: template does not render ({e}); the raw text will be sent"))
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) {
    let mut redacted = config.clone();
    if redacted.api.auth.key.is_some() {
        redacted.api.auth.key = Some("***".into());
    }
    match toml::to_string_pretty(&redacted) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            std::process::exit(1);
        }
    }
}
