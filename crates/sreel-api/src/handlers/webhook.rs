//! Job submission webhook.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use sreel_models::RenderJob;
use sreel_records::JobStore;
use sreel_worker::{IngressMode, RATE_LIMIT_MESSAGE};

use crate::metrics::{record_job_rejected, record_job_submitted};
use crate::state::AppState;

/// The only webhook type this ingress processes.
pub const VIDEO_GENERATION_TYPE: &str = "video_generation";

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: serde_json::Value,
}

/// `POST /webhook`: synchronous job submission.
///
/// Consults the admission controller before doing any work. A saturated
/// submission is rejected with `429` and, when the payload identifies a
/// job record, that record is eagerly marked `failed` with the rate-limit
/// message so the caller is not left with a dangling `queued` row. This
/// fail-fast-and-mark-failed behavior is the defined contract, not an
/// accident.
pub async fn webhook(
    State(state): State<AppState>,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid JSON"})),
        )
            .into_response();
    };

    if request.kind != VIDEO_GENERATION_TYPE {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Unsupported webhook type: {}", request.kind)
            })),
        )
            .into_response();
    }

    let job: RenderJob = match serde_json::from_value(request.payload) {
        Ok(job) => job,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("Invalid payload: {}", e)})),
            )
                .into_response();
        }
    };

    record_job_submitted();

    // standalone mode: acknowledge receipt only, the queue poller owns
    // job discovery
    if state.ctx.config.mode == IngressMode::Standalone {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "accepted": true,
                "jobId": job.job_id,
            })),
        )
            .into_response();
    }

    let Some(ticket) = state.admission.try_acquire() else {
        record_job_rejected();

        if !job.job_id.as_str().is_empty() {
            if let Err(e) = state.ctx.store.fail(&job.job_id, RATE_LIMIT_MESSAGE).await {
                warn!(
                    job_id = %job.job_id,
                    "Failed to mark rejected job as failed: {}", e
                );
            }
        }

        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": RATE_LIMIT_MESSAGE,
                "activeRequests": state.admission.active(),
                "maxRequests": state.admission.ceiling(),
            })),
        )
            .into_response();
    };

    let result = state.orchestrator.run(&job).await;

    // release the render slot before the response goes out
    drop(ticket);

    match result {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({"success": true, "jobId": job.job_id})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": e.to_string(),
                "jobId": job.job_id,
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::routes::create_router;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use sreel_media::{MediaError, MediaProber, MediaResult, RenderEngine, RenderRequest, VideoInfo};
    use sreel_models::{JobId, JobStatus, RenderOutput};
    use sreel_records::{JobStore, RecordResult};
    use sreel_storage::{ObjectStore, PublisherConfig, ResilientPublisher, StorageResult};
    use sreel_worker::{
        AdmissionController, NoopNotifier, ProcessingContext, WorkerConfig,
    };

    const UUID_A: &str = "2c6f1b7e-9f43-4b9a-8a3d-0a1cf54f7a10";
    const UUID_B: &str = "7d1e9c11-5a8f-4d02-9b63-3f8e2c4d5a66";

    #[derive(Default)]
    struct TestStore {
        rows: Mutex<HashMap<String, (JobStatus, Option<String>)>>,
    }

    impl TestStore {
        fn status_of(&self, id: &str) -> Option<JobStatus> {
            self.rows.lock().unwrap().get(id).map(|(s, _)| *s)
        }

        fn error_of(&self, id: &str) -> Option<String> {
            self.rows
                .lock()
                .unwrap()
                .get(id)
                .and_then(|(_, e)| e.clone())
        }
    }

    #[async_trait]
    impl JobStore for TestStore {
        async fn fetch(&self, _job_id: &JobId) -> RecordResult<Option<RenderJob>> {
            Ok(None)
        }

        async fn status(&self, job_id: &JobId) -> RecordResult<Option<JobStatus>> {
            Ok(self.status_of(job_id.as_str()))
        }

        async fn mark_processing(&self, job_id: &JobId) -> RecordResult<()> {
            self.rows
                .lock()
                .unwrap()
                .insert(job_id.to_string(), (JobStatus::Processing, None));
            Ok(())
        }

        async fn complete(&self, job_id: &JobId, _output: &RenderOutput) -> RecordResult<()> {
            self.rows
                .lock()
                .unwrap()
                .insert(job_id.to_string(), (JobStatus::Completed, None));
            Ok(())
        }

        async fn fail(&self, job_id: &JobId, message: &str) -> RecordResult<()> {
            self.rows.lock().unwrap().insert(
                job_id.to_string(),
                (JobStatus::Failed, Some(message.to_string())),
            );
            Ok(())
        }

        async fn oldest_queued(&self) -> RecordResult<Option<RenderJob>> {
            Ok(None)
        }
    }

    struct TestEngine {
        invocations: AtomicU32,
        fail: bool,
    }

    impl TestEngine {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                invocations: AtomicU32::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl RenderEngine for TestEngine {
        async fn render(&self, request: &RenderRequest) -> MediaResult<()> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MediaError::engine_failed(
                    "Render engine exited with non-zero status",
                    None,
                    Some(1),
                ));
            }
            tokio::fs::write(request.output_dir.join("story.mp4"), b"video").await?;
            Ok(())
        }
    }

    struct TestProber;

    #[async_trait]
    impl MediaProber for TestProber {
        async fn probe(&self, _path: &Path) -> MediaResult<VideoInfo> {
            Ok(VideoInfo {
                duration: 12.0,
                width: 1920,
                height: 1080,
                size: 1024,
            })
        }
    }

    struct TestObjectStore;

    #[async_trait]
    impl ObjectStore for TestObjectStore {
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

    struct Harness {
        state: AppState,
        store: Arc<TestStore>,
        engine: Arc<TestEngine>,
        admission: Arc<AdmissionController>,
        _work_dir: TempDir,
    }

    fn harness(mode: IngressMode, engine_fails: bool) -> Harness {
        let work_dir = TempDir::new().unwrap();
        let store = Arc::new(TestStore::default());
        let engine = TestEngine::new(engine_fails);
        let admission = AdmissionController::new(1);

        let ctx = Arc::new(ProcessingContext {
            config: WorkerConfig {
                mode,
                work_dir: work_dir.path().to_string_lossy().to_string(),
                ..WorkerConfig::default()
            },
            store: Arc::clone(&store) as Arc<dyn JobStore>,
            engine: Arc::clone(&engine) as Arc<dyn RenderEngine>,
            prober: Arc::new(TestProber),
            publisher: Arc::new(ResilientPublisher::new(
                Arc::new(TestObjectStore),
                PublisherConfig {
                    base_backoff: Duration::from_millis(1),
                    slot_poll_interval: Duration::from_millis(1),
                    ..PublisherConfig::default()
                },
            )),
            notifier: Arc::new(NoopNotifier),
        });

        let state = AppState::from_parts(ApiConfig::default(), ctx, Arc::clone(&admission));
        Harness {
            state,
            store,
            engine,
            admission,
            _work_dir: work_dir,
        }
    }

    fn webhook_body() -> String {
        json!({
            "type": "video_generation",
            "payload": {
                "jobId": UUID_A,
                "parentStoryId": UUID_B,
                "ownerId": "u1",
                "title": "A short story",
                "script": {
                    "beats": [
                        {"speaker": "A", "text": "hi", "imageDescription": "x"}
                    ]
                }
            }
        })
        .to_string()
    }

    fn post_webhook(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_json_is_rejected() {
        let h = harness(IngressMode::Synchronous, false);
        let app = create_router(h.state.clone(), None);

        let response = app.oneshot(post_webhook("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["error"], "Invalid JSON");
    }

    #[tokio::test]
    async fn test_unsupported_type_is_rejected() {
        let h = harness(IngressMode::Synchronous, false);
        let app = create_router(h.state.clone(), None);

        let body = json!({"type": "story_created", "payload": {}}).to_string();
        let response = app.oneshot(post_webhook(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_successful_submission_end_to_end() {
        let h = harness(IngressMode::Synchronous, false);
        let app = create_router(h.state.clone(), None);

        let response = app.oneshot(post_webhook(webhook_body())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["jobId"], UUID_A);

        assert_eq!(h.store.status_of(UUID_A), Some(JobStatus::Completed));
        // admission counter back to zero after the call
        assert_eq!(h.admission.active(), 0);
    }

    #[tokio::test]
    async fn test_orchestration_failure_returns_500() {
        let h = harness(IngressMode::Synchronous, true);
        let app = create_router(h.state.clone(), None);

        let response = app.oneshot(post_webhook(webhook_body())).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["jobId"], UUID_A);

        assert_eq!(h.store.status_of(UUID_A), Some(JobStatus::Failed));
        assert_eq!(h.admission.active(), 0);
    }

    #[tokio::test]
    async fn test_saturated_submission_gets_429_and_marks_job_failed() {
        let h = harness(IngressMode::Synchronous, false);
        let app = create_router(h.state.clone(), None);

        // hold the only render slot
        let _in_flight = h.admission.try_acquire().unwrap();

        let response = app.oneshot(post_webhook(webhook_body())).await.unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = response_json(response).await;
        assert_eq!(body["activeRequests"], 1);
        assert_eq!(body["maxRequests"], 1);

        assert_eq!(h.store.status_of(UUID_A), Some(JobStatus::Failed));
        let message = h.store.error_of(UUID_A).unwrap();
        assert_eq!(message, RATE_LIMIT_MESSAGE);

        // the engine never ran for the rejected job
        assert_eq!(h.engine.invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_standalone_mode_acknowledges_without_processing() {
        let h = harness(IngressMode::Standalone, false);
        let app = create_router(h.state.clone(), None);

        let response = app.oneshot(post_webhook(webhook_body())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["accepted"], true);

        assert_eq!(h.engine.invocations.load(Ordering::SeqCst), 0);
        assert_eq!(h.store.status_of(UUID_A), None);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let h = harness(IngressMode::Synchronous, false);
        let app = create_router(h.state.clone(), None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"OK");
    }
}
