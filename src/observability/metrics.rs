//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cluster_pool_active_connections` (gauge): connections in rotation
//! - `cluster_pool_dead_connections` (gauge): quarantined connections
//! - `cluster_connection_failures` (gauge): failure count per node
//! - `cluster_requests_total` (counter): requests by node, outcome
//! - `cluster_observer_dropped_total` (counter): snapshots dropped by full channels

use std::net::SocketAddr;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::pool::PoolSnapshot;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record pool composition.
pub fn record_pool_snapshot(snapshot: &PoolSnapshot) {
    metrics::gauge!("cluster_pool_active_connections").set(snapshot.active.len() as f64);
    metrics::gauge!("cluster_pool_dead_connections").set(snapshot.dead.len() as f64);

    for conn in snapshot.active.iter().chain(snapshot.dead.iter()) {
        metrics::gauge!("cluster_connection_failures", "node" => conn.url.clone())
            .set(f64::from(conn.failures));
    }
}

/// Record the outcome of one request attempt.
pub fn record_request(node: &str, outcome: &'static str) {
    metrics::counter!(
        "cluster_requests_total",
        "node" => node.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_observer_dropped() {
    metrics::counter!("cluster_observer_dropped_total").increment(1);
}
