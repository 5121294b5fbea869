//! Mistral adapter contract tests.
//!
//! Verify the exact HTTP shapes sent to the chat, agent, models and
//! transcription endpoints, and how response statuses map onto errors.

use mc_domain::config::{ApiConfig, AuthConfig};
use mc_domain::error::Error;
use mc_domain::message::Message;
use mc_providers::{
    pcm_to_wav, AudioFormat, CompletionClient, CompletionRequest, CompletionTarget, MistralClient,
    Transcriber,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> MistralClient {
    let cfg = ApiConfig {
        base_url: server.uri(),
        auth: AuthConfig {
            env: None,
            key: Some("test-key".into()),
        },
        chat_timeout_ms: 2_000,
        transcription_timeout_ms: 2_000,
        check_timeout_ms: 2_000,
        ..ApiConfig::default()
    };
    MistralClient::from_config(&cfg).unwrap()
}

fn model_request() -> CompletionRequest {
    CompletionRequest {
        target: CompletionTarget::Model {
            model: "ministral-8b-latest".into(),
            max_tokens: 1024,
            temperature: 0.7,
        },
        messages: vec![Message::system("You are helpful."), Message::user("Hello")],
    }
}

fn ok_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "cmpl-1",
        "object": "chat.completion",
        "model": "ministral-8b-2410",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 20, "completion_tokens": 3, "total_tokens": 23}
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Completions
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn model_request_body_and_auth_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "ministral-8b-latest",
            "max_tokens": 1024,
            "temperature": 0.7,
            "messages": [
                {"role": "system", "content": "You are helpful."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_completion(" Hi there! ")))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server).complete(&model_request()).await.unwrap();
    assert_eq!(resp.content, "Hi there!");
    assert_eq!(resp.model, "ministral-8b-2410");
    assert_eq!(resp.usage.unwrap().completion_tokens, 3);
}

#[tokio::test]
async fn agent_request_hits_agent_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/agents/completions"))
        .and(body_partial_json(json!({
            "agent_id": "ag:1234",
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_completion("Agent here")))
        .expect(1)
        .mount(&server)
        .await;

    let req = CompletionRequest {
        target: CompletionTarget::Agent {
            agent_id: "ag:1234".into(),
        },
        messages: vec![Message::user("Hello")],
    };
    let resp = client_for(&server).complete(&req).await.unwrap();
    assert_eq!(resp.content, "Agent here");
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&model_request()).await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&model_request()).await.unwrap_err();
    assert!(matches!(err, Error::RateLimited(_)), "got {err:?}");
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    match client_for(&server).complete(&model_request()).await.unwrap_err() {
        Error::Api { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_server_is_connectivity_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_completion("late"))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).complete(&model_request()).await.unwrap_err();
    assert!(matches!(err, Error::Connectivity(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_host_is_connectivity_error() {
    let cfg = ApiConfig {
        // Port 9 (discard) on loopback is not listening in test environments.
        base_url: "http://127.0.0.1:9".into(),
        auth: AuthConfig {
            env: None,
            key: Some("test-key".into()),
        },
        chat_timeout_ms: 2_000,
        ..ApiConfig::default()
    };
    let client = MistralClient::from_config(&cfg).unwrap();
    let err = client.complete(&model_request()).await.unwrap_err();
    assert!(matches!(err, Error::Connectivity(_)), "got {err:?}");
}

// ────────────────────────────────────────────────────────────────────────────
// Key check
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn key_check_accepts_model_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).check_api_key().await.unwrap();
}

#[tokio::test]
async fn key_check_rejects_invalid_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).check_api_key().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn key_check_server_error_is_not_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).check_api_key().await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 503, .. }));
}

// ────────────────────────────────────────────────────────────────────────────
// Transcription
// ────────────────────────────────────────────────────────────────────────────

fn short_wav() -> Vec<u8> {
    pcm_to_wav(&[0u8; 3200], AudioFormat::default()).unwrap()
}

#[tokio::test]
async fn transcription_sends_multipart_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": " Doe de lamp aan "})))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server)
        .transcribe(short_wav(), Some("nl"))
        .await
        .unwrap();
    assert_eq!(text, "Doe de lamp aan");

    // The WAV header is not valid UTF-8, so inspect the raw body lossily.
    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\"; filename=\"audio.wav\""));
    assert!(body.contains("application/octet-stream"));
    assert!(body.contains("name=\"model\""));
    assert!(body.contains("voxtral-mini-latest"));
    assert!(body.contains("name=\"language\""));
}

#[tokio::test]
async fn transcription_without_language_omits_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "hello"})))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server).transcribe(short_wav(), None).await.unwrap();
    assert_eq!(text, "hello");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("name=\"language\""));
}

#[tokio::test]
async fn empty_transcript_is_recognition_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "   "})))
        .mount(&server)
        .await;

    let err = client_for(&server).transcribe(short_wav(), None).await.unwrap_err();
    assert!(matches!(err, Error::Recognition(_)), "got {err:?}");
}

#[tokio::test]
async fn transcription_error_status_is_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad audio"))
        .mount(&server)
        .await;

    let err = client_for(&server).transcribe(short_wav(), None).await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 400, .. }));
}
