//! Best-effort failure notifications.
//!
//! Alerting must never mask or replace the job's own failure status: the
//! `Notifier` trait returns nothing, and delivery failures are logged and
//! dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

use sreel_models::RenderJob;

/// Structured failure message posted to the alerting endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FailureAlert {
    pub job_id: String,
    pub story_id: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl FailureAlert {
    pub fn new(job: &RenderJob, error: impl Into<String>) -> Self {
        Self {
            job_id: job.job_id.to_string(),
            story_id: job.story_id.to_string(),
            error: error.into(),
            timestamp: Utc::now(),
        }
    }

    /// Human-readable form for chat-style alert endpoints.
    pub fn to_text(&self) -> String {
        format!(
            "Render job failed\njob: {}\nstory: {}\nerror: {}\nat: {}",
            self.job_id,
            self.story_id,
            self.error,
            self.timestamp.to_rfc3339()
        )
    }
}

/// Fire-and-forget alerting channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn alert(&self, alert: &FailureAlert);
}

/// Posts alerts to an HTTP endpoint, swallowing delivery failures.
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn alert(&self, alert: &FailureAlert) {
        let body = serde_json::json!({
            "text": alert.to_text(),
            "jobId": alert.job_id,
            "parentStoryId": alert.story_id,
            "error": alert.error,
            "timestamp": alert.timestamp,
        });

        match self.http.post(&self.url).json(&body).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    job_id = %alert.job_id,
                    status = response.status().as_u16(),
                    "Alert endpoint answered with an error status"
                );
            }
            Ok(_) => {}
            Err(e) => {
                warn!(job_id = %alert.job_id, "Failed to deliver failure alert: {}", e);
            }
        }
    }
}

/// Notifier for tests and deployments without an alert endpoint.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn alert(&self, _alert: &FailureAlert) {}
}
