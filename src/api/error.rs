//! Error types for the video platform API and the collection core

use thiserror::Error;

/// Failures reported by the remote search/catalog API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP request never produced a response. The URL is stripped, it carries the API key.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// The API answered with a non-success status
    #[error("HTTP error {status}: {message}")]
    Status { status: u16, message: String },

    /// The credential was rejected
    #[error("authentication failed ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Daily quota or rate limit exhausted
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A details lookup returned no item for the id
    #[error("video not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A parameter outside what the API accepts
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_transient())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Api(ApiError::Malformed(e.to_string()))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.without_url())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Api(e.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
