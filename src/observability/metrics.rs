//! Metrics collection and exposition.
//!
//! # Metrics
//! - `checkout_requests_total` (counter): API requests by operation, outcome
//! - `checkout_finalizations_total` (counter): on-chain submissions by operation, outcome
//! - `checkout_messages_total` (counter): payment-surface messages by effect

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one API request.
pub fn record_request(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "checkout_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record the outcome of one on-chain submission.
pub fn record_finalization(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "checkout_finalizations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record what a payment-surface message did.
pub fn record_message(effect: &'static str) {
    metrics::counter!("checkout_messages_total", "effect" => effect).increment(1);
}
