use mc_assist::stt::{SpeechToText, SUPPORTED_CODEC, SUPPORTED_CONTAINER};
use mc_domain::config::{Config, ConfigSeverity, ConversationMode};
use mc_domain::error::Error;
use mc_providers::{resolve_api_key, MistralClient};

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("mistral-conversation check");
    println!("==========================\n");

    let mut all_passed = true;

    // 1. Config file
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );

    // 2. Config validation
    check_config_validation(config, &mut all_passed);

    // 3. Conversation mode
    print_check(
        "Conversation mode",
        true,
        match config.options.mode {
            ConversationMode::Model => format!("model {}", config.options.model),
            ConversationMode::Agent => format!("agent {}", config.options.agent_id),
        },
    );

    // 4. Speech-to-text
    let (stt_ok, stt_detail) = stt_summary(config);
    print_check("Speech-to-text", stt_ok, stt_detail);
    if !stt_ok {
        all_passed = false;
    }

    // 5. API key and connectivity
    check_api(config, &mut all_passed).await;

    // Summary
    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
        return;
    }

    print_check(
        "Config validation",
        error_count == 0,
        format!("{} issue(s) ({} error(s))", issues.len(), error_count),
    );
    for issue in &issues {
        println!("      {issue}");
    }
    if error_count > 0 {
        *all_passed = false;
    }
}

/// Fails only when the configured language hint is not one Voxtral knows.
fn stt_summary(config: &Config) -> (bool, String) {
    let fmt = SpeechToText::supported_format();
    let languages = SpeechToText::supported_languages();
    let audio = format!(
        "{SUPPORTED_CONTAINER}/{SUPPORTED_CODEC} {} Hz, {} ch, {}-bit",
        fmt.sample_rate, fmt.channels, fmt.bits_per_sample
    );

    match config.options.stt_language_hint() {
        None => (true, format!("{audio}; language auto ({} known)", languages.len())),
        Some(code) if languages.iter().any(|l| *l == code) => (true, format!("{audio}; language {code}")),
        Some(code) => (false, format!("{audio}; unknown language hint '{code}'")),
    }
}

async fn check_api(config: &Config, all_passed: &mut bool) {
    let key = match resolve_api_key(&config.api.auth) {
        Ok(key) => key,
        Err(e) => {
            print_check("API key configured", false, e.to_string());
            *all_passed = false;
            return;
        }
    };
    print_check("API key configured", true, mask(&key));

    let client = match MistralClient::with_api_key(&config.api, key) {
        Ok(c) => c,
        Err(e) => {
            print_check("Mistral AI reachable", false, e.to_string());
            *all_passed = false;
            return;
        }
    };

    let (passed, detail) = match client.check_api_key().await {
        Ok(()) => (true, format!("{} (key accepted)", config.api.base_url)),
        Err(Error::Auth(_)) => (false, "API key rejected (401)".into()),
        Err(e) => (false, format!("{}: {e}", config.api.base_url)),
    };
    print_check("Mistral AI reachable", passed, detail);
    if !passed {
        *all_passed = false;
    }
}

/// Keep the last four characters visible.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".into();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
