//! Render job processing core.
//!
//! This crate provides:
//! - The job orchestrator (the `queued -> processing -> completed|failed`
//!   state machine)
//! - Render admission control with RAII tickets
//! - The standalone-mode queue poller
//! - Best-effort failure notification

pub mod admission;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod orchestrator;
pub mod poller;

pub use admission::{AdmissionController, AdmissionTicket, RATE_LIMIT_MESSAGE};
pub use config::{IngressMode, WorkerConfig};
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use notify::{FailureAlert, Notifier, NoopNotifier, WebhookNotifier};
pub use orchestrator::{JobOrchestrator, ProcessingContext};
pub use poller::QueuePoller;

#[cfg(test)]
pub(crate) mod testutil;
