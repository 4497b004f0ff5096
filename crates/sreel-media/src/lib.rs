//! Render engine invocation and media handling.
//!
//! This crate provides:
//! - The render engine subprocess runner with hard timeout
//! - Output location across the engine's candidate filenames
//! - FFprobe-based media inspection
//! - Per-job workspace creation and unconditional cleanup

pub mod error;
pub mod locate;
pub mod probe;
pub mod renderer;
pub mod workspace;

pub use error::{MediaError, MediaResult};
pub use locate::{locate_output, move_file, CANONICAL_OUTPUT_NAME};
pub use probe::{FfprobeProber, MediaProber, VideoInfo};
pub use renderer::{EngineProcess, RenderEngine, RenderRequest};
pub use workspace::Workspace;
