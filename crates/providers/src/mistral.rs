//! Mistral AI adapter.
//!
//! Speaks the chat completions, agent completions, model listing and audio
//! transcription endpoints of `https://api.mistral.ai/v1`. Every call is a
//! single attempt bounded by its own timeout.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::Instrument;

use mc_domain::config::ApiConfig;
use mc_domain::error::{Error, Result};
use mc_domain::message::Message;
use mc_domain::trace::TraceEvent;

use crate::traits::{ChatResponse, CompletionClient, CompletionRequest, CompletionTarget, Usage};
use crate::util::{from_reqwest, resolve_api_key, status_error};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// HTTP client for the Mistral AI REST API.
pub struct MistralClient {
    base_url: String,
    api_key: String,
    pub(crate) stt_model: String,
    chat_timeout: Duration,
    pub(crate) transcription_timeout: Duration,
    check_timeout: Duration,
    pub(crate) client: reqwest::Client,
}

impl MistralClient {
    /// Create a client from config, resolving the API key from `[api.auth]`.
    pub fn from_config(cfg: &ApiConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.auth)?;
        Self::with_api_key(cfg, api_key)
    }

    /// Create a client with an explicit key (the host already holds it).
    pub fn with_api_key(cfg: &ApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            stt_model: cfg.stt_model.clone(),
            chat_timeout: Duration::from_millis(cfg.chat_timeout_ms),
            transcription_timeout: Duration::from_millis(cfg.transcription_timeout_ms),
            check_timeout: Duration::from_millis(cfg.check_timeout_ms),
            client,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    // ── Internal: build authenticated request builder ──────────────

    pub(crate) fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.bearer_auth(&self.api_key)
    }

    /// Verify the API key by listing models.
    ///
    /// Used at startup: 401 means the key is wrong, anything else non-2xx
    /// or a transport error means the service is unreachable for now.
    pub async fn check_api_key(&self) -> Result<()> {
        let resp = self
            .authed(self.client.get(self.url("models")))
            .timeout(self.check_timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request body construction
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Endpoint path and JSON body for a completion request.
pub(crate) fn build_completion_body(req: &CompletionRequest) -> (&'static str, Value) {
    let messages: Vec<Value> = req.messages.iter().map(msg_to_mistral).collect();

    match &req.target {
        CompletionTarget::Model {
            model,
            max_tokens,
            temperature,
        } => {
            let temperature = if temperature.is_nan() {
                0.7
            } else {
                // f32 → f64 widening leaves noise digits (0.699999988…).
                (f64::from(temperature.clamp(0.0, 1.0)) * 1000.0).round() / 1000.0
            };
            (
                "chat/completions",
                serde_json::json!({
                    "model": model,
                    "messages": messages,
                    "max_tokens": max_tokens,
                    "temperature": temperature,
                }),
            )
        }
        CompletionTarget::Agent { agent_id } => (
            "agents/completions",
            serde_json::json!({
                "agent_id": agent_id,
                "messages": messages,
            }),
        ),
    }
}

fn msg_to_mistral(msg: &Message) -> Value {
    serde_json::json!({
        "role": msg.role.as_str(),
        "content": msg.content,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) fn parse_chat_response(status: u16, body: &Value) -> Result<ChatResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Api {
            status,
            body: format!("no choices in response: {body}"),
        })?;

    let content = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .map(content_text)
        .unwrap_or_default()
        .trim()
        .to_string();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .map(String::from);

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let usage = body.get("usage").and_then(parse_usage);

    Ok(ChatResponse {
        content,
        usage,
        model,
        finish_reason,
    })
}

/// Message content is usually a string; some models return a list of typed
/// chunks, of which only the text chunks are spoken.
fn content_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Array(chunks) => chunks
            .iter()
            .filter(|c| c.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|c| c.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}

fn parse_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl CompletionClient for MistralClient {
    async fn complete(&self, req: &CompletionRequest) -> Result<ChatResponse> {
        let (path, body) = build_completion_body(req);
        let url = self.url(path);
        let mode = req.target.mode();

        let span = tracing::info_span!(
            "llm.call",
            mode,
            target = %req.target.id(),
            messages = req.messages.len(),
        );

        async move {
            tracing::debug!(url = %url, "mistral completion request");
            let start = Instant::now();

            let result = self
                .authed(self.client.post(&url))
                .timeout(self.chat_timeout)
                .json(&body)
                .send()
                .await;

            let resp = match result {
                Ok(resp) => resp,
                Err(e) => {
                    let err = from_reqwest(e);
                    tracing::error!(error = %err, "Mistral AI request failed");
                    emit_request_event(req, None, start, None);
                    return Err(err);
                }
            };

            let status = resp.status();
            let resp_text = resp.text().await.map_err(from_reqwest)?;

            if !status.is_success() {
                let keys: Vec<&str> = body
                    .as_object()
                    .map(|o| o.keys().map(String::as_str).collect())
                    .unwrap_or_default();
                tracing::error!(
                    status = status.as_u16(),
                    keys = ?keys,
                    body = %resp_text,
                    "Mistral API returned an error"
                );
                emit_request_event(req, Some(status.as_u16()), start, None);
                return Err(status_error(status, resp_text));
            }

            let resp_json: Value = serde_json::from_str(&resp_text)?;
            let parsed = parse_chat_response(status.as_u16(), &resp_json)?;
            emit_request_event(req, Some(status.as_u16()), start, parsed.usage);
            Ok(parsed)
        }
        .instrument(span)
        .await
    }
}

fn emit_request_event(
    req: &CompletionRequest,
    status: Option<u16>,
    start: Instant,
    usage: Option<Usage>,
) {
    TraceEvent::CompletionRequest {
        mode: req.target.mode().into(),
        target: req.target.id().into(),
        messages: req.messages.len(),
        status,
        duration_ms: start.elapsed().as_millis() as u64,
        prompt_tokens: usage.map(|u| u.prompt_tokens),
        completion_tokens: usage.map(|u| u.completion_tokens),
    }
    .emit();
}
