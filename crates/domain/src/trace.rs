use serde::Serialize;

/// Structured trace events emitted across all mistral-conversation crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    PromptBuilt {
        prompt_chars: usize,
        exposed_entities: usize,
        template_fallback: bool,
    },
    CompletionRequest {
        mode: String,
        target: String,
        messages: usize,
        status: Option<u16>,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    ActionDispatched {
        domain: String,
        service: String,
        entity_id: String,
        outcome: String,
    },
    ActionBlocked {
        domain: String,
        service: String,
        entity_id: String,
    },
    TranscriptionCompleted {
        audio_bytes: usize,
        transcript_chars: usize,
        language: Option<String>,
        duration_ms: u64,
    },
    SessionTrimmed {
        conversation_id: String,
        dropped: usize,
        retained: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "mc_event");
    }
}
