//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Emit one event per backend exchange
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` wins over the configured level

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};
use crate::observability::{Exchange, ExchangeOutcome};

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

fn default_directives(level: &str) -> String {
    format!("cors_relay={level},tower_http={level}")
}

pub(crate) fn log_exchange(exchange: &Exchange<'_>) {
    let elapsed_ms = elapsed_millis(exchange.elapsed);
    // Query strings may carry credentials; only the path is logged at info.
    let path = exchange.target.path();
    match exchange.outcome {
        ExchangeOutcome::Relayed(status) => tracing::info!(
            method = %exchange.method,
            path,
            status = status.as_u16(),
            elapsed_ms,
            "Backend responded"
        ),
        ExchangeOutcome::Failed(kind) => tracing::warn!(
            method = %exchange.method,
            path,
            failure = kind,
            elapsed_ms,
            "Backend unreachable"
        ),
    }
    tracing::debug!(target_url = %exchange.target, "Backend exchange target");
}

fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
