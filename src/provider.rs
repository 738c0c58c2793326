use std::time::Duration;

pub mod groq;
pub mod model_map;
pub mod sanitize;

pub use groq::GroqClient;
pub use model_map::{
    is_known_model, known_models, KnownModel, DEFAULT_MODEL, REASONING_TRACE_MODEL,
};
pub use sanitize::{sanitize, TRACE_CLOSE_MARKER, TRACE_OPEN_MARKER};

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Failures of the remote completion call. Every variant leaves the calling
/// stage retryable.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },
    #[error("completion endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response was unreadable: {0}")]
    InvalidResponse(String),
    #[error("completion response contained no text")]
    EmptyContent,
}

/// One text-in/text-out call against a hosted model. Implementations must not
/// retry; a failure goes straight back to the caller.
pub trait CompletionClient {
    fn complete(&self, prompt: &str, credential: &str, model_id: &str)
        -> Result<String, CompletionError>;
}

impl<T: CompletionClient + ?Sized> CompletionClient for &T {
    fn complete(
        &self,
        prompt: &str,
        credential: &str,
        model_id: &str,
    ) -> Result<String, CompletionError> {
        (**self).complete(prompt, credential, model_id)
    }
}

impl<T: CompletionClient + ?Sized> CompletionClient for Box<T> {
    fn complete(
        &self,
        prompt: &str,
        credential: &str,
        model_id: &str,
    ) -> Result<String, CompletionError> {
        (**self).complete(prompt, credential, model_id)
    }
}
