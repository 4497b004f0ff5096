//! HTTP ingress for render job submissions.
//!
//! This crate provides:
//! - `GET /health` liveness probe
//! - `POST /webhook` synchronous job submission with admission control
//! - Prometheus metrics and `/metrics`

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use routes::create_router;
pub use state::AppState;
