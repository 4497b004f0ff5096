//! Render job orchestration.
//!
//! Drives one job through the full state machine:
//! validate -> mark processing -> prepare workspace -> append credit beat
//! -> serialize -> render -> locate output -> publish -> finalize.
//! Any fatal error short-circuits the remaining steps, is persisted to
//! the job record and forwarded to the notifier. Workspace removal is
//! unconditional.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::counter;
use tracing::{error, warn};

use sreel_media::{
    locate_output, EngineProcess, FfprobeProber, MediaProber, RenderEngine, RenderRequest,
    Workspace,
};
use sreel_models::{
    PhaseBreakdown, RenderJob, RenderOutput, FALLBACK_DURATION_SECONDS, FALLBACK_RESOLUTION,
};
use sreel_records::{JobStore, RestJobStore};
use sreel_storage::{PublisherConfig, ResilientPublisher, S3ObjectStore};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::notify::{FailureAlert, Notifier, NoopNotifier, WebhookNotifier};

/// Everything the orchestrator needs to process jobs. Collaborators sit
/// behind traits so tests can substitute them.
pub struct ProcessingContext {
    pub config: WorkerConfig,
    pub store: Arc<dyn JobStore>,
    pub engine: Arc<dyn RenderEngine>,
    pub prober: Arc<dyn MediaProber>,
    pub publisher: Arc<ResilientPublisher>,
    pub notifier: Arc<dyn Notifier>,
}

impl ProcessingContext {
    /// Wire up the real collaborators from environment configuration.
    pub fn from_env(config: WorkerConfig) -> WorkerResult<Self> {
        let store = Arc::new(RestJobStore::from_env()?);
        let engine = Arc::new(EngineProcess::new(
            &config.engine_binary,
            config.render_timeout,
        ));
        let object_store = Arc::new(S3ObjectStore::from_env()?);
        let publisher = Arc::new(ResilientPublisher::new(
            object_store,
            PublisherConfig {
                max_concurrent: config.max_concurrent_publishes,
                max_retries: config.publish_max_retries,
                base_backoff: config.publish_base_backoff,
                slot_poll_interval: Duration::from_millis(200),
            },
        ));
        let notifier: Arc<dyn Notifier> = match &config.alert_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(NoopNotifier),
        };

        Ok(Self {
            config,
            store,
            engine,
            prober: Arc::new(FfprobeProber),
            publisher,
            notifier,
        })
    }
}

/// Runs jobs to their terminal state. A job is mutated only here, and
/// retired (terminal status persisted) exactly once.
pub struct JobOrchestrator {
    ctx: Arc<ProcessingContext>,
}

impl JobOrchestrator {
    pub fn new(ctx: Arc<ProcessingContext>) -> Self {
        Self { ctx }
    }

    /// Process one job to completion. On error the failure has already
    /// been persisted and the notifier informed; the returned error is
    /// for the caller's response only.
    pub async fn run(&self, job: &RenderJob) -> WorkerResult<RenderOutput> {
        let logger = JobLogger::new(job.job_id.as_str(), "render");
        logger.log_start("Processing render job");

        let result = self.execute(job, &logger).await;

        match &result {
            Ok(output) => {
                counter!("sreel_jobs_completed_total").increment(1);
                logger.log_completion(&format!(
                    "Published {} ({:.1}s of video)",
                    output.public_url, output.duration_seconds
                ));
            }
            Err(e) => {
                counter!("sreel_jobs_failed_total").increment(1);
                logger.log_error(&e.to_string());
                if let Err(persist_err) = self.ctx.store.fail(&job.job_id, &e.to_string()).await {
                    error!(
                        job_id = %job.job_id,
                        "Failed to persist failure status: {}", persist_err
                    );
                }
                self.ctx
                    .notifier
                    .alert(&FailureAlert::new(job, e.to_string()))
                    .await;
            }
        }

        result
    }

    async fn execute(&self, job: &RenderJob, logger: &JobLogger) -> WorkerResult<RenderOutput> {
        let started = Instant::now();

        // single validation gate; nothing below runs on invalid input
        job.validate()
            .map_err(|e| WorkerError::InvalidInput(e.to_string()))?;

        // persist the transition before any expensive work so observers
        // never see the job stuck at queued while a render is underway
        self.ctx.store.mark_processing(&job.job_id).await?;

        let workspace = Workspace::create(&self.ctx.config.work_dir, job.job_id.as_str()).await?;

        let outcome = self.render_and_publish(job, &workspace, logger).await;

        // success or failure, the workspace goes away
        workspace.cleanup().await;

        let mut output = outcome?;
        output.processing_seconds = started.elapsed().as_secs_f64();

        self.ctx.store.complete(&job.job_id, &output).await?;
        Ok(output)
    }

    async fn render_and_publish(
        &self,
        job: &RenderJob,
        workspace: &Workspace,
        logger: &JobLogger,
    ) -> WorkerResult<RenderOutput> {
        let script = job
            .script
            .as_ref()
            .ok_or_else(|| WorkerError::invalid_input("script is missing"))?;

        let caption_language = script.caption_language().map(str::to_string);

        // every render gets the trailing credit beat
        let prepared = script.clone().with_credit_beat();
        let serialized = serde_json::to_vec_pretty(&prepared)
            .map_err(|e| WorkerError::render_failed(format!("failed to serialize script: {}", e)))?;
        tokio::fs::write(workspace.script_path(), serialized).await?;

        logger.log_progress("Script serialized, invoking render engine");

        let render_started = Instant::now();
        self.ctx
            .engine
            .render(&RenderRequest {
                script_path: workspace.script_path(),
                output_dir: workspace.output_dir().to_path_buf(),
                burn_captions: caption_language.is_some(),
            })
            .await?;
        let render_seconds = render_started.elapsed().as_secs_f64();

        let output_path = locate_output(workspace.output_dir(), caption_language.as_deref()).await?;

        logger.log_progress("Publishing rendered video");
        let public_url = self
            .ctx
            .publisher
            .publish(&output_path, job.job_id.as_str())
            .await?;

        Ok(self
            .finalize(&output_path, public_url, render_seconds)
            .await)
    }

    /// Probe the produced file for real metadata; fall back to fixed
    /// defaults when probing fails. Metadata accuracy is best-effort, not
    /// load-bearing.
    async fn finalize(
        &self,
        output_path: &std::path::Path,
        public_url: String,
        render_seconds: f64,
    ) -> RenderOutput {
        let (duration_seconds, resolution, probed_size) =
            match self.ctx.prober.probe(output_path).await {
                Ok(info) => (
                    info.duration,
                    RenderOutput::format_resolution(info.width, info.height),
                    info.size,
                ),
                Err(e) => {
                    warn!("Probe failed, using fallback metadata: {}", e);
                    (
                        FALLBACK_DURATION_SECONDS,
                        FALLBACK_RESOLUTION.to_string(),
                        0,
                    )
                }
            };

        let size_bytes = if probed_size > 0 {
            probed_size
        } else {
            tokio::fs::metadata(output_path)
                .await
                .map(|m| m.len())
                .unwrap_or(0)
        };

        RenderOutput {
            public_url,
            duration_seconds,
            resolution,
            size_megabytes: size_bytes as f64 / (1024.0 * 1024.0),
            // overwritten with total wall-clock once orchestration ends
            processing_seconds: render_seconds,
            phases: PhaseBreakdown::estimate(render_seconds),
        }
    }
}
