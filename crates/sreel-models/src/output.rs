//! Completed-job output records.

use serde::{Deserialize, Serialize};

/// Duration assumed when the media prober cannot read the produced file.
pub const FALLBACK_DURATION_SECONDS: f64 = 30.0;

/// Resolution assumed when the media prober cannot read the produced file.
pub const FALLBACK_RESOLUTION: &str = "1920x1080";

/// Per-phase processing time. These numbers are *estimated* as fixed
/// proportions of total render wall-clock time, not measured; `estimated`
/// stays `true` so downstream reports cannot mistake them for ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseBreakdown {
    pub image_seconds: f64,
    pub voice_seconds: f64,
    pub composition_seconds: f64,
    pub estimated: bool,
}

impl PhaseBreakdown {
    /// Split total render time 65/20/15 across image, voice and
    /// composition phases.
    pub fn estimate(total_seconds: f64) -> Self {
        Self {
            image_seconds: total_seconds * 0.65,
            voice_seconds: total_seconds * 0.20,
            composition_seconds: total_seconds * 0.15,
            estimated: true,
        }
    }
}

/// Output record for a completed render job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    /// Stable public URL of the published video.
    pub public_url: String,
    pub duration_seconds: f64,
    /// Formatted as `{width}x{height}`, e.g. "1920x1080".
    pub resolution: String,
    pub size_megabytes: f64,
    /// Total orchestration wall-clock time.
    pub processing_seconds: f64,
    pub phases: PhaseBreakdown,
}

impl RenderOutput {
    /// Format a width/height pair the way the output record expects.
    pub fn format_resolution(width: u32, height: u32) -> String {
        format!("{}x{}", width, height)
    }
}
