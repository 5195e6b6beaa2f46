//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request Forwarder (after every backend exchange)
//!     → ExchangeObserver::observe
//!         → logging.rs (structured log event)
//!         → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Observation is a side channel: the relay control flow never branches on it
//! - Request ID flows through the trace span of every request
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use url::Url;

/// How a single backend exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The backend answered (any status, including non-2xx).
    Relayed(StatusCode),
    /// The backend could not be reached; carries the failure kind.
    Failed(&'static str),
}

/// One proxied request/response pair.
#[derive(Debug)]
pub struct Exchange<'a> {
    pub method: &'a Method,
    pub target: &'a Url,
    pub outcome: ExchangeOutcome,
    pub elapsed: Duration,
}

/// Receives every exchange performed by the forwarder.
pub trait ExchangeObserver: Send + Sync {
    fn observe(&self, exchange: &Exchange<'_>);
}

/// Logs the exchange and records it in the metrics registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultObserver;

impl ExchangeObserver for DefaultObserver {
    fn observe(&self, exchange: &Exchange<'_>) {
        logging::log_exchange(exchange);
        metrics::record_exchange(exchange);
    }
}
