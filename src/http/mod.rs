//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → relay.rs (API surface or asset fallback)
//!     → preflight.rs (OPTIONS answered locally)
//!     → request.rs (outbound request from inbound)
//!     → forward.rs (single backend call with deadline)
//!     → response.rs (relay status, headers, streamed body)
//!     → error.rs (failures become JSON 500s)
//!     → cors.rs (policy headers on every API response)
//!     → Send to client
//! ```

pub mod cors;
pub mod error;
pub mod forward;
pub mod preflight;
pub mod relay;
pub mod request;
pub mod response;
pub mod server;

pub use cors::CorsPolicy;
pub use error::{ForwardingError, RelayError};
pub use forward::Forwarder;
pub use relay::RelayState;
pub use request::{MakeRelayRequestId, OutboundRequest, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
