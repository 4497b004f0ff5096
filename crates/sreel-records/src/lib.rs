//! Record store access for render jobs.
//!
//! This crate provides:
//! - A REST row-store client (point updates by id, filtered reads)
//! - Bounded retry with backoff for retryable record errors
//! - The `JobStore` trait and its REST implementation

pub mod client;
pub mod error;
pub mod jobs;
pub mod retry;

pub use client::{RecordsConfig, RestClient};
pub use error::{RecordError, RecordResult};
pub use jobs::{JobStore, RestJobStore, JOBS_TABLE};
pub use retry::{with_retry, RetryConfig};
