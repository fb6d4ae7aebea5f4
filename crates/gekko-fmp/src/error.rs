use thiserror::Error;

/// Errors that can be returned by gekko-fmp operations.
#[derive(Debug, Error)]
pub enum FmpError {
    /// An HTTP request failed (network error, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to deserialize the response body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL and path do not form a valid URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// HTTP 404 for the requested resource.
    #[error("not found: {0}")]
    NotFound(String),

    /// HTTP 429 again after the single retry.
    #[error("rate limited by the data provider")]
    RateLimited,

    /// Any other non-2xx status.
    #[error("data provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// HTTP 200 carrying an `{"Error Message": ...}` body.
    #[error("data provider error: {0}")]
    Provider(String),
}

impl FmpError {
    /// `true` when the error only means "nothing for this symbol".
    pub fn is_no_data(&self) -> bool {
        matches!(self, FmpError::NotFound(_))
    }
}
