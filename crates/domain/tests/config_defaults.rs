use mc_domain::config::{Config, ConfigSeverity, ConversationMode, DEFAULT_PROMPT};

#[test]
fn default_base_url_is_mistral() {
    let config = Config::default();
    assert_eq!(config.api.base_url, "https://api.mistral.ai/v1");
    assert_eq!(config.api.stt_model, "voxtral-mini-latest");
}

#[test]
fn default_timeouts() {
    let config = Config::default();
    assert_eq!(config.api.chat_timeout_ms, 30_000);
    assert_eq!(config.api.transcription_timeout_ms, 60_000);
    assert_eq!(config.api.check_timeout_ms, 10_000);
}

#[test]
fn default_options_match_integration_defaults() {
    let config = Config::default();
    assert_eq!(config.options.mode, ConversationMode::Model);
    assert_eq!(config.options.model, "ministral-8b-latest");
    assert_eq!(config.options.max_tokens, 1024);
    assert!((config.options.temperature - 0.7).abs() < 1e-6);
    assert!(config.options.control_ha);
    assert!(config.options.stt_language.is_empty());
    assert_eq!(config.options.prompt, DEFAULT_PROMPT);
}

#[test]
fn default_config_validates_clean() {
    assert!(Config::default().validate().is_empty());
}

#[test]
fn empty_toml_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.api.auth.env.as_deref(), Some("MISTRAL_API_KEY"));
    assert_eq!(config.home.location_name, "Home");
}

#[test]
fn options_section_parses() {
    let toml_str = r#"
[options]
mode = "agent"
agent_id = "ag:1234"
max_tokens = 512
temperature = 0.2
control_ha = false
stt_language = "nl"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.options.mode, ConversationMode::Agent);
    assert_eq!(config.options.agent_id, "ag:1234");
    assert_eq!(config.options.max_tokens, 512);
    assert!(!config.options.control_ha);
    assert_eq!(config.options.stt_language_hint(), Some("nl"));
}

#[test]
fn home_entities_parse_with_defaults() {
    let toml_str = r#"
[home]
location_name = "Casa"
time_zone = "Europe/Amsterdam"

[[home.entities]]
entity_id = "light.kitchen"
name = "Kitchen light"
state = "off"

[[home.entities]]
entity_id = "lock.front_door"
exposed = false
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.home.entities.len(), 2);
    assert!(config.home.entities[0].exposed);
    assert_eq!(config.home.entities[1].state, "unknown");
    assert!(!config.home.entities[1].exposed);
}

#[test]
fn out_of_range_values_are_errors() {
    let toml_str = r#"
[options]
max_tokens = 16000
temperature = 1.5
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    let fields: Vec<&str> = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .map(|i| i.field.as_str())
        .collect();
    assert!(fields.contains(&"options.max_tokens"));
    assert!(fields.contains(&"options.temperature"));
}

#[test]
fn agent_mode_without_agent_id_is_an_error() {
    let toml_str = r#"
[options]
mode = "agent"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.field == "options.agent_id" && i.severity == ConfigSeverity::Error));
}

#[test]
fn unknown_model_is_only_a_warning() {
    let toml_str = r#"
[options]
model = "codestral-latest"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Warning);
    assert!(issues[0].to_string().starts_with("[WARN] options.model"));
}
