//! Prometheus metrics recorder and `/metrics` rendering.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the handle used to render `/metrics`. Call once at startup,
/// before any metric is recorded.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from `handle`.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric names recorded across crates.

/// Sessions created (counter).
pub const SESSIONS_CREATED_TOTAL: &str = "sessions_created_total";
/// Sessions that ended in error (counter, labels: reason).
pub const SESSIONS_FAILED_TOTAL: &str = "sessions_failed_total";
/// Sessions not yet completed or failed (gauge).
pub const SESSIONS_ACTIVE: &str = "sessions_active";
/// Human action submissions (counter, labels: result).
pub const HUMAN_ACTIONS_TOTAL: &str = "human_actions_total";
