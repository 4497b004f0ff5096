//! REST row-store client.
//!
//! The record store speaks a PostgREST-style API: rows live under
//! `/rest/v1/{table}`, point updates are `PATCH` with an `id=eq.{id}`
//! filter, and reads are `GET` with filter/order/limit query parameters.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{RecordError, RecordResult};

/// Configuration for the record store client.
#[derive(Debug, Clone)]
pub struct RecordsConfig {
    /// Base URL of the record store service
    pub base_url: String,
    /// Service API key
    pub api_key: String,
    /// Per-request transport timeout
    pub timeout: Duration,
}

impl RecordsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> RecordResult<Self> {
        Ok(Self {
            base_url: std::env::var("RECORDS_BASE_URL")
                .map_err(|_| RecordError::config_error("RECORDS_BASE_URL not set"))?,
            api_key: std::env::var("RECORDS_API_KEY")
                .map_err(|_| RecordError::config_error("RECORDS_API_KEY not set"))?,
            timeout: Duration::from_secs(
                std::env::var("RECORDS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }
}

/// HTTP client for the record store.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    /// Create a new client from configuration.
    pub fn new(config: RecordsConfig) -> RecordResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RecordError::config_error(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> RecordResult<Self> {
        Self::new(RecordsConfig::from_env()?)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Read at most one row matching `filters`, optionally ordered.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        order: Option<&str>,
    ) -> RecordResult<Option<T>> {
        let mut request = self
            .http
            .get(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(filters)
            .query(&[("limit", "1")]);

        if let Some(order) = order {
            request = request.query(&[("order", order)]);
        }

        let response = request.send().await?;
        let rows: Vec<T> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    /// Apply a partial update to the rows matching `filter`.
    pub async fn update_where<T: Serialize>(
        &self,
        table: &str,
        filter: (&str, String),
        patch: &T,
    ) -> RecordResult<()> {
        debug!(table, filter = %format!("{}={}", filter.0, filter.1), "Updating record");

        let response = self
            .http
            .patch(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .query(&[filter])
            .json(patch)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn check(response: reqwest::Response) -> RecordResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RecordError::RateLimited);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RecordError::Http {
            status: status.as_u16(),
            body,
        })
    }
}
