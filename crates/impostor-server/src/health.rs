//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Sessions that have not completed or failed.
    pub active_sessions: usize,
    /// Every session created since startup.
    pub total_sessions: usize,
}

/// Build a health response from live counters.
pub fn health_check(start_time: Instant, active: usize, total: usize) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        active_sessions: active,
        total_sessions: total,
    }
}
