//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while rendering or inspecting media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Render engine '{0}' not found in PATH")]
    EngineNotFound(String),

    #[error("Render engine failed: {message}")]
    EngineFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Render timed out after {0} seconds")]
    Timeout(u64),

    #[error("Render engine produced no output in {0}")]
    OutputMissing(PathBuf),

    #[error("FFprobe not found in PATH")]
    ProbeNotFound,

    #[error("FFprobe failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a render engine failure error.
    pub fn engine_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::EngineFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }
}
