//! Typed repository for render job rows.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use sreel_models::{JobId, JobStatus, RenderJob, RenderOutput};

use crate::client::RestClient;
use crate::error::RecordResult;
use crate::retry::{with_retry, RetryConfig};

/// Table holding one row per render job, keyed by `jobId`.
pub const JOBS_TABLE: &str = "render_jobs";

/// Persistence operations the job pipeline needs. One row per job; point
/// updates by id plus the "oldest queued" query used by the poller.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Read the full job row.
    async fn fetch(&self, job_id: &JobId) -> RecordResult<Option<RenderJob>>;

    /// Read just the job's current status.
    async fn status(&self, job_id: &JobId) -> RecordResult<Option<JobStatus>>;

    /// Persist `status = processing` before any expensive work begins.
    async fn mark_processing(&self, job_id: &JobId) -> RecordResult<()>;

    /// Persist terminal success with the output record.
    async fn complete(&self, job_id: &JobId, output: &RenderOutput) -> RecordResult<()>;

    /// Persist terminal failure with the error message.
    async fn fail(&self, job_id: &JobId, message: &str) -> RecordResult<()>;

    /// The single oldest row still in `queued`.
    async fn oldest_queued(&self) -> RecordResult<Option<RenderJob>>;
}

/// REST-backed job store.
#[derive(Debug, Clone)]
pub struct RestJobStore {
    client: RestClient,
    retry: RetryConfig,
}

impl RestJobStore {
    pub fn new(client: RestClient) -> Self {
        Self {
            client,
            retry: RetryConfig::default(),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> RecordResult<Self> {
        Ok(Self {
            client: RestClient::from_env()?,
            retry: RetryConfig::from_env(),
        })
    }

    fn id_filter(job_id: &JobId) -> (&'static str, String) {
        ("jobId", format!("eq.{}", job_id))
    }
}

#[derive(Debug, Deserialize)]
struct StatusRow {
    status: JobStatus,
}

#[async_trait]
impl JobStore for RestJobStore {
    async fn fetch(&self, job_id: &JobId) -> RecordResult<Option<RenderJob>> {
        with_retry(&self.retry, "fetch_job", || async {
            self.client
                .select_one::<RenderJob>(JOBS_TABLE, &[Self::id_filter(job_id)], None)
                .await
        })
        .await
    }

    async fn status(&self, job_id: &JobId) -> RecordResult<Option<JobStatus>> {
        let row = with_retry(&self.retry, "fetch_job_status", || async {
            self.client
                .select_one::<StatusRow>(
                    JOBS_TABLE,
                    &[Self::id_filter(job_id), ("select", "status".to_string())],
                    None,
                )
                .await
        })
        .await?;
        Ok(row.map(|r| r.status))
    }

    async fn mark_processing(&self, job_id: &JobId) -> RecordResult<()> {
        let now = Utc::now();
        let patch = json!({
            "status": JobStatus::Processing.as_str(),
            "startedAt": now,
            "updatedAt": now,
        });

        with_retry(&self.retry, "mark_processing", || async {
            self.client
                .update_where(JOBS_TABLE, Self::id_filter(job_id), &patch)
                .await
        })
        .await
    }

    async fn complete(&self, job_id: &JobId, output: &RenderOutput) -> RecordResult<()> {
        let now = Utc::now();
        let patch = json!({
            "status": JobStatus::Completed.as_str(),
            "output": output,
            "errorMessage": null,
            "completedAt": now,
            "updatedAt": now,
        });

        let result = with_retry(&self.retry, "complete_job", || async {
            self.client
                .update_where(JOBS_TABLE, Self::id_filter(job_id), &patch)
                .await
        })
        .await;

        if result.is_ok() {
            info!(job_id = %job_id, "Job record marked completed");
        }
        result
    }

    async fn fail(&self, job_id: &JobId, message: &str) -> RecordResult<()> {
        let now = Utc::now();
        let patch = json!({
            "status": JobStatus::Failed.as_str(),
            "errorMessage": message,
            "completedAt": now,
            "updatedAt": now,
        });

        with_retry(&self.retry, "fail_job", || async {
            self.client
                .update_where(JOBS_TABLE, Self::id_filter(job_id), &patch)
                .await
        })
        .await
    }

    async fn oldest_queued(&self) -> RecordResult<Option<RenderJob>> {
        with_retry(&self.retry, "oldest_queued", || async {
            self.client
                .select_one::<RenderJob>(
                    JOBS_TABLE,
                    &[("status", format!("eq.{}", JobStatus::Queued.as_str()))],
                    Some("createdAt.asc"),
                )
                .await
        })
        .await
    }
}
