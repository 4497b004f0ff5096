//! Object storage for rendered videos.
//!
//! This crate provides:
//! - An S3-compatible client with public URL derivation
//! - The resilient publisher: bounded concurrency, transient-error
//!   classification, and retry with exponential backoff

pub mod client;
pub mod error;
pub mod publisher;

pub use client::{ObjectStore, S3ObjectStore, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use publisher::{object_key, PublisherConfig, ResilientPublisher};
