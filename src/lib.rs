//! CORS relay library.
//!
//! Forwards requests under a public API prefix to a fixed backend origin,
//! swapping the prefix, and adds cross-origin headers to every answer.

pub mod assets;
pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
