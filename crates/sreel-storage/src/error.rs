//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure storage client: {0}")]
    ConfigError(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    /// Classify an error as transient (worth retrying).
    ///
    /// Transient means a network-class failure, or the destination
    /// answering with an HTML error page where a structured body was
    /// expected (load balancers do this under pressure). Everything else
    /// is permanent and propagates immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::UploadFailed(msg) => is_transient_message(msg),
            StorageError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

fn is_transient_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();

    // HTML body where JSON/XML was expected
    if msg.contains("<html") || msg.contains("<!doctype") {
        return true;
    }

    msg.contains("connection reset")
        || msg.contains("connection refused")
        || msg.contains("connection closed")
        || msg.contains("broken pipe")
        || msg.contains("timed out")
        || msg.contains("timeout")
        || msg.contains("dns error")
        || msg.contains("failed to lookup address")
        || msg.contains("dispatch failure")
}
