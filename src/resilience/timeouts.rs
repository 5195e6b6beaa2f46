//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound connection establishment (applied on the HTTP client)
//! - Bound the wait for the backend's response head
//! - Bound silence between reads (applied on the HTTP client)
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - The body as a whole has no deadline, so large payloads are not cut off;
//!   only a stalled backend is

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::config::TimeoutConfig;

/// The wait exceeded its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} elapsed")]
pub struct TimedOut(pub Duration);

/// Deadlines applied to every backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub connect: Duration,
    pub response: Duration,
    pub read: Duration,
}

impl TimeoutPolicy {
    pub fn from_config(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_secs),
            response: Duration::from_secs(config.response_secs),
            read: Duration::from_secs(config.read_secs),
        }
    }

    /// Run `fut`, giving up once the response deadline passes.
    pub async fn bound_response<F: Future>(&self, fut: F) -> Result<F::Output, TimedOut> {
        tokio::time::timeout(self.response, fut)
            .await
            .map_err(|_| TimedOut(self.response))
    }
}
