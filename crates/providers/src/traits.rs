use mc_domain::error::Result;
use mc_domain::message::Message;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which endpoint answers the request, with its endpoint-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionTarget {
    /// `POST /chat/completions` against a named model.
    Model {
        model: String,
        max_tokens: u32,
        /// Clamped to 0.0 – 1.0 before sending.
        temperature: f32,
    },
    /// `POST /agents/completions`; the agent owns its own instructions.
    Agent { agent_id: String },
}

impl CompletionTarget {
    /// `"model"` or `"agent"`, for logs.
    pub fn mode(&self) -> &'static str {
        match self {
            CompletionTarget::Model { .. } => "model",
            CompletionTarget::Agent { .. } => "agent",
        }
    }

    /// The model or agent id.
    pub fn id(&self) -> &str {
        match self {
            CompletionTarget::Model { model, .. } => model,
            CompletionTarget::Agent { agent_id } => agent_id,
        }
    }
}

/// One completion request: a target plus the ordered messages.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub target: CompletionTarget,
    pub messages: Vec<Message>,
}

/// Token accounting reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A completed reply.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Trimmed text of the first choice. Empty when the model said nothing.
    pub content: String,
    pub usage: Option<Usage>,
    /// The model that actually produced the response.
    pub model: String,
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// The model stopped at the token limit rather than finishing.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client traits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Performs exactly one remote completion per call. No retries.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, req: &CompletionRequest) -> Result<ChatResponse>;
}

/// Turns a WAV container into text.
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// `language` is a hint; `None` lets the service detect it.
    async fn transcribe(&self, wav: Vec<u8>, language: Option<&str>) -> Result<String>;
}
