//! Prometheus recorder behind the `metrics` facade.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global recorder. Must run once, before the first metric.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("metrics recorder already initialized"))
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}
