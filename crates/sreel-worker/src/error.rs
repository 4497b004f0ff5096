//! Worker error types.
//!
//! The variants map the failure taxonomy: input and capacity errors never
//! reach the render engine, render errors are never retried, publish
//! errors carry their own retry budget inside the publisher.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Capacity exceeded: {active} of {max} render slots in use")]
    CapacityExceeded { active: usize, max: usize },

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Media error: {0}")]
    Media(#[from] sreel_media::MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] sreel_storage::StorageError),

    #[error("Record store error: {0}")]
    Records(#[from] sreel_records::RecordError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn render_failed(msg: impl Into<String>) -> Self {
        Self::RenderFailed(msg.into())
    }

    /// Check if this is a capacity rejection.
    pub fn is_capacity(&self) -> bool {
        matches!(self, WorkerError::CapacityExceeded { .. })
    }

    /// Check if this is an input validation failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, WorkerError::InvalidInput(_))
    }
}
