//! Health check handler.

/// Liveness probe: answers if the process can answer at all, constant
/// time, no dependency checks.
pub async fn health() -> &'static str {
    "OK"
}
