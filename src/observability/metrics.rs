//! Metrics collection and exposition.
//!
//! # Metrics
//! - `authz_filter_decisions_total` (counter): requests by handler, decision
//! - `authz_filter_request_duration_seconds` (histogram): pipeline latency by handler

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::filters::Decision;

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Record one pass through a filter pipeline.
pub fn record_decision(handler: &str, decision: Decision, start: Instant) {
    let labels = [
        ("handler", handler.to_string()),
        ("decision", decision.as_str().to_string()),
    ];
    metrics::counter!("authz_filter_decisions_total", &labels).increment(1);
    metrics::histogram!(
        "authz_filter_request_duration_seconds",
        "handler" => handler.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
