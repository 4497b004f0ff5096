//! Render job definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::output::RenderOutput;
use crate::script::SceneScript;

/// Unique identifier for a render job. Must be a canonical UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

/// Identifier of the story the job belongs to. Must be a canonical UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is a canonical hyphenated UUID.
    pub fn is_canonical_uuid(&self) -> bool {
        is_canonical_uuid(&self.0)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StoryId {
    /// Generate a new random story ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is a canonical hyphenated UUID.
    pub fn is_canonical_uuid(&self) -> bool {
        is_canonical_uuid(&self.0)
    }
}

impl Default for StoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check that a string is a canonical hyphenated UUID (not the simple,
/// braced, or urn form that `Uuid::try_parse` would also accept).
pub fn is_canonical_uuid(s: &str) -> bool {
    match Uuid::try_parse(s) {
        Ok(u) => u.as_hyphenated().to_string() == s.to_ascii_lowercase(),
        Err(_) => false,
    }
}

/// Job processing status. Transitions are one-directional:
/// `queued -> processing -> completed | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting to be claimed by a worker
    #[default]
    Queued,
    /// Actively being processed
    Processing,
    /// Finished successfully, output populated
    Completed,
    /// Finished with an error, error message populated
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input validation failures. These are fatal: no partial processing
/// occurs and the render engine is never invoked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobValidationError {
    #[error("jobId is not a canonical UUID: {0}")]
    InvalidJobId(String),

    #[error("parentStoryId is not a canonical UUID: {0}")]
    InvalidStoryId(String),

    #[error("script is missing")]
    MissingScript,

    #[error("script has no beats")]
    EmptyScript,

    #[error("beat {0} has no speaker")]
    BlankSpeaker(usize),
}

/// One request to render a scene script into a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub job_id: JobId,

    #[serde(rename = "parentStoryId")]
    pub story_id: StoryId,

    pub owner_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The scene script to render. The core never synthesizes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<SceneScript>,

    #[serde(default)]
    pub status: JobStatus,

    /// Populated only on `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<RenderOutput>,

    /// Populated only on `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl RenderJob {
    /// Create a freshly submitted job in the `queued` state.
    pub fn new(
        job_id: JobId,
        story_id: StoryId,
        owner_id: impl Into<String>,
        title: Option<String>,
        script: SceneScript,
    ) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            story_id,
            owner_id: owner_id.into(),
            title,
            script: Some(script),
            status: JobStatus::Queued,
            output: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    /// Validate the job before any processing. This is the single
    /// validation gate; malformed identifiers are never passed on to the
    /// render engine.
    pub fn validate(&self) -> Result<(), JobValidationError> {
        if !self.job_id.is_canonical_uuid() {
            return Err(JobValidationError::InvalidJobId(self.job_id.0.clone()));
        }
        if !self.story_id.is_canonical_uuid() {
            return Err(JobValidationError::InvalidStoryId(self.story_id.0.clone()));
        }
        let script = self.script.as_ref().ok_or(JobValidationError::MissingScript)?;
        if script.beats.is_empty() {
            return Err(JobValidationError::EmptyScript);
        }
        if let Some(idx) = script.beats.iter().position(|b| b.speaker.trim().is_empty()) {
            return Err(JobValidationError::BlankSpeaker(idx));
        }
        Ok(())
    }

    /// Start processing the job.
    pub fn start(mut self) -> Self {
        self.status = JobStatus::Processing;
        self.started_at = Some(Utc::now());
        self.updated_at = Utc::now();
        self
    }

    /// Mark the job as completed with its output record.
    pub fn complete(mut self, output: RenderOutput) -> Self {
        self.status = JobStatus::Completed;
        self.output = Some(output);
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        self
    }

    /// Mark the job as failed.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = JobStatus::Failed;
        self.error_message = Some(error.into());
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        self
    }
}
