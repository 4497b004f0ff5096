//! Record store error types.

use thiserror::Error;

/// Result type for record store operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors that can occur talking to the record store.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to configure record store client: {0}")]
    ConfigError(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Record store answered {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Rate limited by record store")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecordError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// Check if the error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            RecordError::Network(_) | RecordError::RateLimited => true,
            RecordError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
