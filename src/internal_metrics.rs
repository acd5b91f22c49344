//! # Internal Metrics
//!
//! Descriptions for every metric the pipeline records, and the Prometheus
//! recorder whose rendered output is served at `/metrics`.
//!
//! Recording goes through the `metrics` facade at the call sites. Without an
//! installed recorder those calls are no-ops, which is what tests and one-shot
//! CLI runs rely on.

use anyhow::Result;
use metrics::Unit;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Registers descriptions for all supported metrics with the global recorder.
pub fn describe() {
    metrics::describe_counter!(
        "notifications_sent_total",
        Unit::Count,
        "Total number of per-token notifications accepted by the transport, labeled by kind."
    );
    metrics::describe_counter!(
        "notifications_failed_total",
        Unit::Count,
        "Total number of per-token notifications that failed to deliver, labeled by kind."
    );
    metrics::describe_histogram!(
        "dispatch_duration_seconds",
        Unit::Seconds,
        "Time taken to deliver one notification to all of its targets."
    );
    metrics::describe_counter!(
        "triggers_total",
        Unit::Count,
        "Total number of handler invocations, labeled by kind and outcome."
    );
}

/// Installs the Prometheus recorder globally and returns the handle used to
/// render the exposition text.
pub fn install_prometheus() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe();
    Ok(handle)
}
