use thiserror::Error;

/// Errors that can be returned by a [`crate::ChatModel`].
#[derive(Debug, Error)]
pub enum LlmError {
    /// The HTTP request failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a body that is not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider rejected the request with a non-2xx status.
    #[error("provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    /// The provider answered HTTP 429.
    #[error("rate limited by the model provider")]
    RateLimited,

    /// The response contained no choice with text content.
    #[error("provider returned no completion")]
    EmptyResponse,

    /// No API key was configured.
    #[error("no API key configured for the model provider")]
    MissingApiKey,
}
