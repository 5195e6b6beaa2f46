//! CORS relay
//!
//! A stateless reverse proxy built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────────────┐
//!                          │                        CORS RELAY                         │
//!                          │                                                           │
//!   Client Request         │  ┌─────────┐    ┌────────────┐   not /api   ┌──────────┐  │
//!   ───────────────────────┼─▶│  http   │───▶│  routing   │─────────────▶│  assets  │  │
//!                          │  │ server  │    │ classifier │              └──────────┘  │
//!                          │  └─────────┘    └─────┬──────┘                            │
//!                          │                       │ /api                              │
//!                          │                       ▼                                   │
//!                          │   OPTIONS ◀──── ┌────────────┐                            │
//!                          │   (local 200)   │ preflight  │                            │
//!                          │                 └─────┬──────┘                            │
//!                          │                       ▼                                   │
//!                          │                 ┌────────────┐    ┌───────────┐           │
//!                          │                 │  resolver  │───▶│ forwarder │───────────┼──▶ Backend
//!                          │                 └────────────┘    └─────┬─────┘           │
//!                          │                       failures ─▶ error │ response        │
//!   Client Response        │  ┌──────────┐                           ▼                 │
//!   ◀──────────────────────┼──│   CORS   │◀──────────────────────────┘                 │
//!                          │  │  policy  │                                             │
//!                          │  └──────────┘                                             │
//!                          └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use cors_relay::config::load_config;
use cors_relay::lifecycle::startup;
use cors_relay::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "cors-relay")]
#[command(about = "Reverse proxy that adds CORS headers to a backend API", long_about = None)]
struct Cli {
    /// TOML configuration file. RELAY_* environment variables override it.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability);

    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        public_prefix = %config.proxy.public_prefix,
        backend_origin = %config.proxy.backend_origin,
        backend_prefix = %config.proxy.backend_prefix,
        response_timeout_secs = config.timeouts.response_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
