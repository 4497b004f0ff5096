//! Resilient artifact publisher.
//!
//! Publishing has its own concurrency ceiling, independent of render
//! admission: the destination service has its own rate limits. Callers
//! over the ceiling wait (short-sleep poll) instead of being rejected;
//! publish is cheap to wait for, rendering is not.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use std::sync::Arc;
use tracing::{info, warn};

use crate::client::ObjectStore;
use crate::error::StorageResult;

const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Publisher behavior configuration.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Maximum concurrent uploads.
    pub max_concurrent: usize,
    /// Retries after the initial attempt, transient errors only.
    pub max_retries: u32,
    /// Base delay for exponential backoff (doubles each retry).
    pub base_backoff: Duration,
    /// How often a waiting caller re-checks for a free slot.
    pub slot_poll_interval: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            max_retries: 3,
            base_backoff: Duration::from_secs(2),
            slot_poll_interval: Duration::from_millis(200),
        }
    }
}

/// Uploads rendered videos to durable storage and resolves their public
/// URL, retrying transient failures with exponential backoff.
pub struct ResilientPublisher {
    store: Arc<dyn ObjectStore>,
    config: PublisherConfig,
    active: AtomicUsize,
}

/// Storage key for a job's published video.
pub fn object_key(job_id: &str) -> String {
    format!("stories/{}.mp4", job_id)
}

impl ResilientPublisher {
    pub fn new(store: Arc<dyn ObjectStore>, config: PublisherConfig) -> Self {
        Self {
            store,
            config,
            active: AtomicUsize::new(0),
        }
    }

    /// Upload `file` for `job_id` and return the stable public URL.
    ///
    /// Fails only after exhausting retries on transient errors; permanent
    /// errors propagate immediately. The concurrency slot is released on
    /// every path.
    pub async fn publish(&self, file: &Path, job_id: &str) -> StorageResult<String> {
        let key = object_key(job_id);

        self.wait_for_slot().await;
        let _slot = SlotGuard { active: &self.active };

        self.upload_with_retry(file, &key).await?;
        Ok(self.store.public_url(&key))
    }

    async fn wait_for_slot(&self) {
        loop {
            let current = self.active.load(Ordering::SeqCst);
            if current < self.config.max_concurrent
                && self
                    .active
                    .compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            {
                return;
            }
            tokio::time::sleep(self.config.slot_poll_interval).await;
        }
    }

    async fn upload_with_retry(&self, file: &Path, key: &str) -> StorageResult<()> {
        let mut attempt = 0u32;

        loop {
            match self.store.upload_file(file, key, VIDEO_CONTENT_TYPE).await {
                Ok(()) => {
                    if attempt > 0 {
                        info!(key, attempt = attempt + 1, "Upload succeeded after retry");
                    }
                    return Ok(());
                }
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        key,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient upload failure, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Backoff for retry `attempt` (1-based): base, 2*base, 4*base, ...
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.config
            .base_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

struct SlotGuard<'a> {
    active: &'a AtomicUsize,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
