//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sync_refresh_total` (counter, by outcome): refresh cycles run
//! - `sync_refresh_duration_seconds` (histogram): cycle wall time
//! - `sync_routes` / `sync_clusters` (gauges): size of the published snapshot

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
///
/// Failure to install is logged, never fatal: a synchronizer without metrics
/// still synchronizes.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(error) => tracing::error!(%error, "failed to install metrics exporter"),
    }
}

/// Record the outcome and duration of one refresh cycle.
pub fn record_refresh(outcome: &'static str, duration: Duration) {
    metrics::counter!("sync_refresh_total", "outcome" => outcome).increment(1);
    metrics::histogram!("sync_refresh_duration_seconds").record(duration.as_secs_f64());
}

/// Record the shape of the snapshot that was just published.
pub fn record_snapshot(routes: usize, clusters: usize) {
    metrics::gauge!("sync_routes").set(routes as f64);
    metrics::gauge!("sync_clusters").set(clusters as f64);
}
