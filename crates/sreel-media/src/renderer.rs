//! Render engine subprocess runner.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// How much of the engine's stderr to keep in a failure error.
const STDERR_TAIL_BYTES: usize = 4096;

/// One invocation of the render engine: a serialized script file, the
/// directory the output video must land in, and whether captions are
/// burned into the frames.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub script_path: PathBuf,
    pub output_dir: PathBuf,
    pub burn_captions: bool,
}

/// The external rendering engine. Exit code 0 means success; the output
/// filename within `output_dir` is engine-chosen (see [`crate::locate`]).
#[async_trait]
pub trait RenderEngine: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> MediaResult<()>;
}

/// Runs the engine binary as a subprocess with a hard timeout.
#[derive(Debug, Clone)]
pub struct EngineProcess {
    binary: String,
    timeout_secs: u64,
}

impl EngineProcess {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout_secs: timeout.as_secs(),
        }
    }
}

#[async_trait]
impl RenderEngine for EngineProcess {
    async fn render(&self, request: &RenderRequest) -> MediaResult<()> {
        which::which(&self.binary)
            .map_err(|_| MediaError::EngineNotFound(self.binary.clone()))?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg("--script")
            .arg(&request.script_path)
            .arg("--output-dir")
            .arg(&request.output_dir);
        if request.burn_captions {
            cmd.arg("--burn-captions");
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            engine = %self.binary,
            script = %request.script_path.display(),
            "Invoking render engine"
        );

        let output = match tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            cmd.output(),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    engine = %self.binary,
                    timeout_secs = self.timeout_secs,
                    "Render engine timed out, killing process"
                );
                return Err(MediaError::Timeout(self.timeout_secs));
            }
        };

        if output.status.success() {
            Ok(())
        } else {
            Err(MediaError::engine_failed(
                "Render engine exited with non-zero status",
                Some(stderr_tail(&output.stderr)),
                output.status.code(),
            ))
        }
    }
}

/// Keep only the tail of the engine's stderr; renders can emit megabytes
/// of progress output and only the end explains the failure.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    match text.char_indices().nth_back(STDERR_TAIL_BYTES) {
        Some((idx, _)) => text[idx..].to_string(),
        None => text.to_string(),
    }
}
