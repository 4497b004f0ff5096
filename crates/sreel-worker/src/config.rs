//! Worker configuration.

use std::time::Duration;

/// How jobs reach the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngressMode {
    /// One job per HTTP call; the caller waits for completion.
    #[default]
    Synchronous,
    /// The webhook only acknowledges receipt; the queue poller discovers
    /// and claims jobs from the record store.
    Standalone,
}

impl IngressMode {
    fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "standalone" | "standalone-poll" | "watch" => IngressMode::Standalone,
            _ => IngressMode::Synchronous,
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Render admission ceiling (concurrent renders)
    pub max_concurrent_renders: usize,
    /// Publish admission ceiling (concurrent uploads)
    pub max_concurrent_publishes: usize,
    /// Operating mode
    pub mode: IngressMode,
    /// Queue poll interval (standalone mode)
    pub poll_interval: Duration,
    /// Hard timeout on the render subprocess
    pub render_timeout: Duration,
    /// Publish retries after the initial attempt (transient errors only)
    pub publish_max_retries: u32,
    /// Base backoff between publish retries (doubles each attempt)
    pub publish_base_backoff: Duration,
    /// Base directory for per-job workspaces
    pub work_dir: String,
    /// Render engine binary name
    pub engine_binary: String,
    /// Alert webhook for failure notifications (optional)
    pub alert_webhook_url: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_renders: 1,
            max_concurrent_publishes: 2,
            mode: IngressMode::Synchronous,
            poll_interval: Duration::from_secs(5),
            render_timeout: Duration::from_secs(600), // 10 minutes
            publish_max_retries: 3,
            publish_base_backoff: Duration::from_secs(2),
            work_dir: "/tmp/sreel".to_string(),
            engine_binary: "sreel-engine".to_string(),
            alert_webhook_url: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_concurrent_renders: std::env::var("RENDER_MAX_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            max_concurrent_publishes: std::env::var("PUBLISH_MAX_CONCURRENT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            mode: std::env::var("INGRESS_MODE")
                .map(|s| IngressMode::parse(&s))
                .unwrap_or_default(),
            poll_interval: Duration::from_secs(
                std::env::var("POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            render_timeout: Duration::from_secs(
                std::env::var("RENDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            publish_max_retries: std::env::var("PUBLISH_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            publish_base_backoff: Duration::from_secs(
                std::env::var("PUBLISH_BASE_BACKOFF_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            ),
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/tmp/sreel".to_string()),
            engine_binary: std::env::var("RENDER_ENGINE_BIN")
                .unwrap_or_else(|_| "sreel-engine".to_string()),
            alert_webhook_url: std::env::var("ALERT_WEBHOOK_URL").ok(),
        }
    }
}
