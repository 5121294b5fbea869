/// Shared error type used across all mistral-conversation crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The API key was rejected (HTTP 401).
    #[error("auth: {0}")]
    Auth(String),

    /// The API refused the request because of rate limits (HTTP 429).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other non-success HTTP status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Transport-level failure: DNS, connect, reset, or timeout.
    #[error("connectivity: {0}")]
    Connectivity(String),

    /// Nothing to transcribe, or the transcript came back empty.
    #[error("recognition: {0}")]
    Recognition(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Coarse classification used by turn results and trace events.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Auth(_) => ErrorKind::Authentication,
            Error::RateLimited(_) => ErrorKind::RateLimited,
            Error::Api { .. } | Error::Json(_) => ErrorKind::Api,
            Error::Connectivity(_) | Error::Io(_) => ErrorKind::Connectivity,
            Error::Recognition(_) => ErrorKind::Recognition,
            Error::Config(_) => ErrorKind::Config,
            Error::Other(_) => ErrorKind::Unknown,
        }
    }
}

/// Outcome classes surfaced to callers when a request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    RateLimited,
    Api,
    Connectivity,
    Recognition,
    Config,
    Unknown,
}

pub type Result<T> = std::result::Result<T, Error>;
