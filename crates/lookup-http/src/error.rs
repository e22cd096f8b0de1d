//! Error types for the HTTP lookup backend

use lookup_core::LookupError;

/// Failures talking to the lookup backend
#[derive(Debug, thiserror::Error)]
pub enum HttpLookupError {
    /// Base URL or endpoint path cannot form a request URL
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Identifier is a dot segment that URL normalization would swallow
    #[error("identifier `{0}` cannot be sent as a path segment")]
    UnaddressableIdentifier(String),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection or protocol failure
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// No response within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error code from the backend envelope, if any
        code: Option<String>,
        /// Error message from the backend envelope, or the status reason
        message: String,
    },

    /// Response body is not JSON
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl HttpLookupError {
    /// Check if a later attempt could succeed
    ///
    /// Only used for log levels; the controller never retries on its own.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl(_)
            | Self::UnaddressableIdentifier(_)
            | Self::Client(_)
            | Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for HttpLookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e)
        }
    }
}

impl From<HttpLookupError> for LookupError {
    fn from(e: HttpLookupError) -> Self {
        LookupError::failed(e.to_string())
    }
}
