//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): backend exchanges by method, status, outcome
//! - `relay_request_duration_seconds` (histogram): backend latency
//! - `relay_preflight_total` (counter): preflights answered locally
//! - `relay_asset_requests_total` (counter): requests handed to the asset fallback
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::observability::{Exchange, ExchangeOutcome};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(
            address = %addr,
            error = %e,
            "Failed to install metrics exporter"
        ),
    }
}

pub(crate) fn record_exchange(exchange: &Exchange<'_>) {
    let (status, outcome) = match exchange.outcome {
        ExchangeOutcome::Relayed(status) => (status.as_u16().to_string(), "relayed"),
        ExchangeOutcome::Failed(kind) => ("500".to_string(), kind),
    };

    counter!(
        "relay_requests_total",
        "method" => exchange.method.to_string(),
        "status" => status,
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        "relay_request_duration_seconds",
        "method" => exchange.method.to_string()
    )
    .record(exchange.elapsed.as_secs_f64());
}

pub fn record_preflight() {
    counter!("relay_preflight_total").increment(1);
}

pub fn record_asset() {
    counter!("relay_asset_requests_total").increment(1);
}
