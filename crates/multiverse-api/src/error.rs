//! Error types for remote API operations.

/// Result type alias for remote API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Remote API error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The API found nothing for the request (unknown id or a filter with no matches).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success response.
    #[error("API returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, if any.
        message: String,
    },
}

impl Error {
    /// Returns true if the API reported that nothing matched the request.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
