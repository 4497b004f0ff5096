//! Shared data models for the StoryReel backend.
//!
//! This crate provides Serde-serializable types for:
//! - Render jobs and their status lifecycle
//! - Scene scripts (narrated beats) and the credit-beat transform
//! - Completed-job output records and estimated phase timings

pub mod job;
pub mod output;
pub mod script;

// Re-export common types
pub use job::{JobId, JobStatus, JobValidationError, RenderJob, StoryId};
pub use output::{PhaseBreakdown, RenderOutput, FALLBACK_DURATION_SECONDS, FALLBACK_RESOLUTION};
pub use script::{Beat, CaptionStyle, SceneScript, VoiceAssignment, CREDIT_IMAGE_DESCRIPTION};
