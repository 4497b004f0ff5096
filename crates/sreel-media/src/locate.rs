//! Locating and relocating the engine's output file.
//!
//! The engine picks the output filename itself: normally the canonical
//! name, but caption burn-in makes it emit a language-suffixed file, and
//! older engine builds used `output.mp4`. Callers check an ordered
//! candidate list and relocate the first hit to the canonical path.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// The filename the rest of the pipeline expects.
pub const CANONICAL_OUTPUT_NAME: &str = "story.mp4";

/// Candidate output filenames, most likely first.
pub fn candidate_names(caption_language: Option<&str>) -> Vec<String> {
    let mut names = vec![CANONICAL_OUTPUT_NAME.to_string()];
    if let Some(lang) = caption_language {
        names.push(format!("story_{}.mp4", lang));
        names.push("story_captioned.mp4".to_string());
    }
    // legacy engine builds
    names.push("output.mp4".to_string());
    names
}

/// Find the engine's output in `dir` and make sure it sits at the
/// canonical path. Returns the canonical path, or `OutputMissing` when no
/// candidate exists.
pub async fn locate_output(dir: &Path, caption_language: Option<&str>) -> MediaResult<PathBuf> {
    let canonical = dir.join(CANONICAL_OUTPUT_NAME);

    for name in candidate_names(caption_language) {
        let candidate = dir.join(&name);
        if fs::try_exists(&candidate).await.unwrap_or(false) {
            if candidate != canonical {
                tracing::debug!(
                    found = %candidate.display(),
                    canonical = %canonical.display(),
                    "Relocating engine output to canonical path"
                );
                move_file(&candidate, &canonical).await?;
            }
            return Ok(canonical);
        }
    }

    Err(MediaError::OutputMissing(dir.to_path_buf()))
}

/// Move a file, falling back to copy-and-delete for cross-device moves
/// (EXDEV), since the workspace and destination may be on different
/// filesystems.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            fs::copy(src, dst).await?;
            if let Err(e) = fs::remove_file(src).await {
                tracing::warn!(
                    src = %src.display(),
                    "Failed to remove source after cross-device move: {}",
                    e
                );
            }
            Ok(())
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// EXDEV is error code 18 on Linux/macOS.
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}
