//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_events_total` (counter): chat events by kind
//! - `gateway_validation_failures_total` (counter): rejected inputs by step
//! - `gateway_transactions_total` (counter): submissions by intent and result
//! - `gateway_faucet_claims_total` (counter): confirmed claims by token
//! - `gateway_cooldown_rejections_total` (counter): claims refused while cooling down
//!
//! # Design Decisions
//! - Low-overhead updates (atomic counters behind the metrics macros)
//! - Prometheus exporter on its own listener, enabled via config

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Failure is logged, not
/// fatal; the gateway runs fine without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one inbound chat event.
pub fn record_event(kind: &str) {
    metrics::counter!("gateway_events_total", "kind" => kind.to_string()).increment(1);
}

/// Count one rejected user input.
pub fn record_validation_failure(step: &str) {
    metrics::counter!("gateway_validation_failures_total", "step" => step.to_string())
        .increment(1);
}

/// Count one transaction submission outcome.
pub fn record_transaction(intent: &str, outcome: &str) {
    metrics::counter!(
        "gateway_transactions_total",
        "intent" => intent.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Count one confirmed faucet claim.
pub fn record_faucet_claim(symbol: &str) {
    metrics::counter!("gateway_faucet_claims_total", "token" => symbol.to_string()).increment(1);
}

/// Count one claim refused by the cooldown window.
pub fn record_cooldown_rejection(symbol: &str) {
    metrics::counter!("gateway_cooldown_rejections_total", "token" => symbol.to_string())
        .increment(1);
}
