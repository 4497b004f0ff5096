//! Shared test doubles for orchestrator and poller tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use sreel_media::{MediaError, MediaProber, MediaResult, RenderEngine, RenderRequest, VideoInfo};
use sreel_models::{Beat, JobId, JobStatus, RenderJob, RenderOutput, SceneScript, StoryId};
use sreel_records::{JobStore, RecordResult};
use sreel_storage::{ObjectStore, StorageResult};

use crate::notify::{FailureAlert, Notifier};

pub const UUID_A: &str = "2c6f1b7e-9f43-4b9a-8a3d-0a1cf54f7a10";
pub const UUID_B: &str = "7d1e9c11-5a8f-4d02-9b63-3f8e2c4d5a66";

pub fn valid_job() -> RenderJob {
    RenderJob::new(
        JobId::from_string(UUID_A),
        StoryId::from_string(UUID_B),
        "u1",
        Some("A short story".to_string()),
        SceneScript::from_beats(vec![Beat {
            speaker: "A".to_string(),
            text: "hi".to_string(),
            image_description: "x".to_string(),
        }]),
    )
}

// ---------------------------------------------------------------------------
// Job store
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
struct Row {
    job: Option<RenderJob>,
    status: JobStatus,
    error_message: Option<String>,
    output: Option<RenderOutput>,
    processing_seen: bool,
}

/// In-memory job store recording every status transition.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    rows: Mutex<HashMap<String, Row>>,
}

impl MemoryJobStore {
    pub fn with_job(job: RenderJob) -> Arc<Self> {
        let store = Self::default();
        store.insert(job);
        Arc::new(store)
    }

    pub fn insert(&self, job: RenderJob) {
        let mut rows = self.rows.lock().unwrap();
        rows.insert(
            job.job_id.to_string(),
            Row {
                status: job.status,
                job: Some(job),
                ..Row::default()
            },
        );
    }

    pub fn status_of(&self, job_id: &str) -> Option<JobStatus> {
        self.rows.lock().unwrap().get(job_id).map(|r| r.status)
    }

    pub fn terminal_state(&self, job_id: &str) -> (Option<JobStatus>, Option<String>) {
        let rows = self.rows.lock().unwrap();
        match rows.get(job_id) {
            Some(row) => (Some(row.status), row.error_message.clone()),
            None => (None, None),
        }
    }

    pub fn output_of(&self, job_id: &str) -> Option<RenderOutput> {
        self.rows
            .lock()
            .unwrap()
            .get(job_id)
            .and_then(|r| r.output.clone())
    }

    pub fn saw_processing(&self, job_id: &str) -> bool {
        self.rows
            .lock()
            .unwrap()
            .get(job_id)
            .map(|r| r.processing_seen)
            .unwrap_or(false)
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn fetch(&self, job_id: &JobId) -> RecordResult<Option<RenderJob>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(job_id.as_str())
            .and_then(|r| r.job.clone()))
    }

    async fn status(&self, job_id: &JobId) -> RecordResult<Option<JobStatus>> {
        Ok(self.status_of(job_id.as_str()))
    }

    async fn mark_processing(&self, job_id: &JobId) -> RecordResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry(job_id.to_string()).or_default();
        row.status = JobStatus::Processing;
        row.processing_seen = true;
        Ok(())
    }

    async fn complete(&self, job_id: &JobId, output: &RenderOutput) -> RecordResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry(job_id.to_string()).or_default();
        row.status = JobStatus::Completed;
        row.output = Some(output.clone());
        Ok(())
    }

    async fn fail(&self, job_id: &JobId, message: &str) -> RecordResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry(job_id.to_string()).or_default();
        row.status = JobStatus::Failed;
        row.error_message = Some(message.to_string());
        Ok(())
    }

    async fn oldest_queued(&self) -> RecordResult<Option<RenderJob>> {
        let rows = self.rows.lock().unwrap();
        let mut queued: Vec<&Row> = rows
            .values()
            .filter(|r| r.status == JobStatus::Queued && r.job.is_some())
            .collect();
        queued.sort_by_key(|r| r.job.as_ref().map(|j| j.created_at));
        Ok(queued.first().and_then(|r| r.job.clone()))
    }
}

/// Store whose oldest-queued snapshot is stale: the authoritative status
/// it reports differs from the snapshot. Exercises the poller's
/// optimistic claim re-check.
#[derive(Debug)]
pub struct StaleSnapshotStore {
    snapshot: RenderJob,
    reported_status: Option<JobStatus>,
    processing_calls: AtomicU32,
}

impl StaleSnapshotStore {
    pub fn new(snapshot: RenderJob, reported_status: Option<JobStatus>) -> Arc<Self> {
        Arc::new(Self {
            snapshot,
            reported_status,
            processing_calls: AtomicU32::new(0),
        })
    }

    pub fn processing_calls(&self) -> u32 {
        self.processing_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobStore for StaleSnapshotStore {
    async fn fetch(&self, _job_id: &JobId) -> RecordResult<Option<RenderJob>> {
        Ok(Some(self.snapshot.clone()))
    }

    async fn status(&self, _job_id: &JobId) -> RecordResult<Option<JobStatus>> {
        Ok(self.reported_status)
    }

    async fn mark_processing(&self, _job_id: &JobId) -> RecordResult<()> {
        self.processing_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn complete(&self, _job_id: &JobId, _output: &RenderOutput) -> RecordResult<()> {
        Ok(())
    }

    async fn fail(&self, _job_id: &JobId, _message: &str) -> RecordResult<()> {
        Ok(())
    }

    async fn oldest_queued(&self) -> RecordResult<Option<RenderJob>> {
        Ok(Some(self.snapshot.clone()))
    }
}

// ---------------------------------------------------------------------------
// Render engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum EngineBehavior {
    /// Exit 0 without writing anything.
    Succeed,
    /// Exit 0 after writing the named file into the output directory.
    WriteOutput(String),
    /// Non-zero exit.
    Fail,
}

/// Engine double that records its invocations and the script it was
/// handed.
pub struct StubEngine {
    behavior: EngineBehavior,
    invocations: AtomicU32,
    last_request: Mutex<Option<RenderRequest>>,
    last_script: Mutex<Option<serde_json::Value>>,
}

impl StubEngine {
    pub fn new(behavior: EngineBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            invocations: AtomicU32::new(0),
            last_request: Mutex::new(None),
            last_script: Mutex::new(None),
        })
    }

    pub fn invocations(&self) -> u32 {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RenderRequest> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn last_script(&self) -> Option<serde_json::Value> {
        self.last_script.lock().unwrap().clone()
    }
}

#[async_trait]
impl RenderEngine for StubEngine {
    async fn render(&self, request: &RenderRequest) -> MediaResult<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Ok(bytes) = tokio::fs::read(&request.script_path).await {
            if let Ok(value) = serde_json::from_slice(&bytes) {
                *self.last_script.lock().unwrap() = Some(value);
            }
        }

        match &self.behavior {
            EngineBehavior::Succeed => Ok(()),
            EngineBehavior::WriteOutput(name) => {
                tokio::fs::write(request.output_dir.join(name), b"rendered-video").await?;
                Ok(())
            }
            EngineBehavior::Fail => Err(MediaError::engine_failed(
                "Render engine exited with non-zero status",
                Some("boom".to_string()),
                Some(1),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Prober / object store / notifier
// ---------------------------------------------------------------------------

/// Prober double with a fixed answer.
pub struct StubProber {
    result: Option<VideoInfo>,
}

impl StubProber {
    pub fn ok(info: VideoInfo) -> Arc<Self> {
        Arc::new(Self { result: Some(info) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { result: None })
    }
}

#[async_trait]
impl MediaProber for StubProber {
    async fn probe(&self, path: &Path) -> MediaResult<VideoInfo> {
        match self.result {
            Some(info) => Ok(info),
            None => Err(MediaError::ProbeFailed {
                message: format!("stub probe failure for {}", path.display()),
                stderr: None,
            }),
        }
    }
}

/// Object store double that always accepts uploads.
#[derive(Debug, Default)]
pub struct StubStore;

#[async_trait]
impl ObjectStore for StubStore {
    async fn upload_file(
        &self,
        _path: &Path,
        _key: &str,
        _content_type: &str,
    ) -> StorageResult<()> {
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.test/{}", key)
    }
}

/// Notifier double recording every alert.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<FailureAlert>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<FailureAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn alert(&self, alert: &FailureAlert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}
