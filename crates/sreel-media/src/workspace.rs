//! Per-job workspaces.
//!
//! A workspace is a directory owned exclusively by one job for its
//! lifetime, keyed by job id so concurrent jobs can never collide. It is
//! created at the start of orchestration and removed unconditionally when
//! orchestration ends.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::warn;

use crate::error::MediaResult;
use crate::locate::CANONICAL_OUTPUT_NAME;

/// Job-exclusive temporary directory holding the serialized script and
/// the rendered output before publication.
#[derive(Debug, Clone)]
pub struct Workspace {
    job_id: String,
    root: PathBuf,
}

impl Workspace {
    /// Create the workspace directory under `base_dir`.
    pub async fn create(base_dir: impl AsRef<Path>, job_id: &str) -> MediaResult<Self> {
        let root = base_dir.as_ref().join(job_id);
        fs::create_dir_all(&root).await?;
        Ok(Self {
            job_id: job_id.to_string(),
            root,
        })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the serialized script is written for the engine.
    pub fn script_path(&self) -> PathBuf {
        self.root.join("script.json")
    }

    /// Directory the engine renders into.
    pub fn output_dir(&self) -> &Path {
        &self.root
    }

    /// Canonical path of the rendered video inside the workspace.
    pub fn output_path(&self) -> PathBuf {
        self.root.join(CANONICAL_OUTPUT_NAME)
    }

    /// Remove the workspace recursively. Never fails: by the time cleanup
    /// runs the job's terminal status is already decided, so a cleanup
    /// error is logged and dropped.
    pub async fn cleanup(&self) {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(
                    job_id = %self.job_id,
                    workspace = %self.root.display(),
                    "Failed to remove workspace: {}",
                    e
                );
            }
        }
    }
}
