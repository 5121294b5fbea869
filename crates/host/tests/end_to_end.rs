//! Config file → AppState → turn, against a mocked Mistral API and the
//! simulated home.

use std::sync::Arc;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mc_assist::{ConversationInput, DispatchOutcome};
use mc_domain::config::{Config, ConversationMode};
use mc_domain::home::HomeActions;
use mc_host::bootstrap::{build_app_state, KeyCheck};
use mc_host::cli::load_config_from;

fn write_config(dir: &tempfile::TempDir, base_url: &str) -> String {
    let path = dir.path().join("config.toml");
    let raw = format!(
        r#"
[api]
base_url = "{base_url}"
chat_timeout_ms = 2000

[api.auth]
key = "test-key"

[options]
model = "ministral-8b-latest"
temperature = 0.2

[home]
location_name = "Test House"
time_zone = "Europe/Amsterdam"

[[home.entities]]
entity_id = "light.kitchen"
name = "Kitchen"
state = "on"

[[home.entities]]
entity_id = "switch.hidden"
exposed = false
"#
    );
    std::fs::write(&path, raw).unwrap();
    path.to_string_lossy().into_owned()
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

async fn load(server: &MockServer, dir: &tempfile::TempDir) -> Arc<Config> {
    let path = write_config(dir, &server.uri());
    Arc::new(load_config_from(&path).unwrap())
}

#[test]
fn missing_config_file_gives_defaults() {
    let cfg = load_config_from("/nonexistent/mc-config.toml").unwrap();
    assert_eq!(cfg.options.mode, ConversationMode::Model);
    assert_eq!(cfg.home.location_name, "Home");
    assert!(cfg.home.entities.is_empty());
}

#[test]
fn malformed_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[options\nmodel = ").unwrap();
    let err = load_config_from(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("parsing"));
}

#[tokio::test]
async fn config_file_drives_a_device_turn() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"action":"call_service","domain":"light","service":"turn_off","entity_id":"light.kitchen"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = load(&server, &dir).await;
    let state = build_app_state(config, KeyCheck::Verify).await.unwrap();

    let result = state
        .agent
        .process(ConversationInput::new("turn off the kitchen light"), &CancellationToken::new())
        .await;

    assert!(!result.is_error());
    assert_eq!(result.speech, "Done! Kitchen is turned off.");
    assert!(matches!(result.action, Some(DispatchOutcome::Executed(_))));
    assert_eq!(state.home.entity_state("light.kitchen").unwrap().state, "off");
    assert_eq!(state.sessions.len(&result.conversation_id), 2);

    // The prompt carried the location and only the exposed entity.
    let requests = server.received_requests().await.unwrap();
    let chat = requests
        .iter()
        .find(|r| r.url.path() == "/chat/completions")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&chat.body).unwrap();
    let system = body["messages"][0]["content"].as_str().unwrap();
    assert!(system.contains("Test House"));
    assert!(system.contains("light.kitchen"));
    assert!(!system.contains("switch.hidden"));
}

#[tokio::test]
async fn rejected_key_fails_startup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = load(&server, &dir).await;
    let err = build_app_state(config, KeyCheck::Verify).await.err().unwrap();
    assert!(format!("{err:#}").contains("rejected"));
}

#[tokio::test]
async fn unreachable_key_check_is_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = load(&server, &dir).await;
    assert!(build_app_state(config, KeyCheck::Verify).await.is_ok());
}

#[tokio::test]
async fn agent_mode_without_id_is_refused() {
    let mut config = Config::default();
    config.api.auth.key = Some("test-key".into());
    config.options.mode = ConversationMode::Agent;

    let err = build_app_state(Arc::new(config), KeyCheck::Skip).await.err().unwrap();
    assert!(err.to_string().contains("config validation failed"));
}

#[tokio::test]
async fn wav_file_is_transcribed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": " hello there "})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = load(&server, &dir).await;
    let state = build_app_state(config, KeyCheck::Skip).await.unwrap();

    let wav_path = dir.path().join("hello.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(&wav_path, spec).unwrap();
    for i in 0..1600i16 {
        w.write_sample(i).unwrap();
    }
    w.finalize().unwrap();

    let (format, pcm) = mc_host::cli::transcribe::read_pcm(&wav_path).unwrap();
    let chunks: Vec<Vec<u8>> = pcm.chunks(512).map(<[u8]>::to_vec).collect();
    let text = state
        .stt
        .process_audio_stream(format, futures_util::stream::iter(chunks))
        .await
        .unwrap();
    assert_eq!(text, "hello there");
}
