pub mod mistral;
pub mod traits;
pub mod transcription;
pub mod wav;
pub(crate) mod util;

// Re-exports for convenience.
pub use mistral::MistralClient;
pub use traits::{
    ChatResponse, CompletionClient, CompletionRequest, CompletionTarget, Transcriber, Usage,
};
pub use util::resolve_api_key;
pub use wav::{pcm_to_wav, AudioFormat};
