//! Standalone-mode queue poller.
//!
//! An alternative ingress for deployments that prefer a long-running
//! worker loop over synchronous HTTP processing: every interval, claim
//! the single oldest `queued` job from the record store and run it
//! through the orchestrator.
//!
//! The claim is optimistic read-then-act, not compare-and-swap: the
//! status is re-read just before claiming, and a job that is no longer
//! `queued` is skipped. That is sufficient for single-digit worker
//! counts sharing one record store; a large fleet would need an atomic
//! claim instead.

use std::sync::Arc;

use tracing::{debug, info, warn};

use sreel_models::{JobId, JobStatus};
use sreel_records::JobStore;

use crate::admission::AdmissionController;
use crate::error::WorkerResult;
use crate::orchestrator::{JobOrchestrator, ProcessingContext};

pub struct QueuePoller {
    ctx: Arc<ProcessingContext>,
    orchestrator: JobOrchestrator,
    admission: Arc<AdmissionController>,
}

impl QueuePoller {
    pub fn new(ctx: Arc<ProcessingContext>, admission: Arc<AdmissionController>) -> Self {
        let orchestrator = JobOrchestrator::new(Arc::clone(&ctx));
        Self {
            ctx,
            orchestrator,
            admission,
        }
    }

    /// Run the poll loop until the process shuts down. One job per cycle;
    /// the interval elapses regardless of whether a job was found.
    pub async fn run(&self) {
        info!(
            interval_secs = self.ctx.config.poll_interval.as_secs(),
            "Starting queue poller"
        );

        let mut interval = tokio::time::interval(self.ctx.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if let Err(e) = self.poll_once().await {
                warn!("Poll cycle failed: {}", e);
            }
        }
    }

    /// One poll cycle. Returns the id of the job that was processed, if
    /// any.
    pub async fn poll_once(&self) -> WorkerResult<Option<JobId>> {
        let Some(job) = self.ctx.store.oldest_queued().await? else {
            return Ok(None);
        };

        // another worker may have claimed it between the query and now
        match self.ctx.store.status(&job.job_id).await? {
            Some(JobStatus::Queued) => {}
            other => {
                debug!(
                    job_id = %job.job_id,
                    status = ?other,
                    "Job no longer queued, skipping cycle"
                );
                return Ok(None);
            }
        }

        let Some(_ticket) = self.admission.try_acquire() else {
            debug!("Render slots exhausted, skipping cycle");
            return Ok(None);
        };

        // failure is already persisted and notified by the orchestrator
        let _ = self.orchestrator.run(&job).await;
        Ok(Some(job.job_id.clone()))
    }
}
