//! Application state.

use std::sync::Arc;

use sreel_worker::{AdmissionController, JobOrchestrator, ProcessingContext, WorkerConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub ctx: Arc<ProcessingContext>,
    pub orchestrator: Arc<JobOrchestrator>,
    pub admission: Arc<AdmissionController>,
}

impl AppState {
    /// Create new application state wired to the real collaborators.
    pub fn new(config: ApiConfig, worker_config: WorkerConfig) -> anyhow::Result<Self> {
        let admission = AdmissionController::new(worker_config.max_concurrent_renders);
        let ctx = Arc::new(ProcessingContext::from_env(worker_config)?);
        Ok(Self::from_parts(config, ctx, admission))
    }

    /// Assemble state from pre-built parts (used by tests).
    pub fn from_parts(
        config: ApiConfig,
        ctx: Arc<ProcessingContext>,
        admission: Arc<AdmissionController>,
    ) -> Self {
        let orchestrator = Arc::new(JobOrchestrator::new(Arc::clone(&ctx)));
        Self {
            config,
            ctx,
            orchestrator,
            admission,
        }
    }
}
