//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (connect deadline on the client, response deadline per call)
//!     → On failure: surfaced once as a ForwardingError
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - No retries: non-idempotent methods must never be replayed

pub mod timeouts;
