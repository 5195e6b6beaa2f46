//! Request forwarding to the backend.
//!
//! # Responsibilities
//! - Issue the outbound request once, with no retry
//! - Bound the wait for the backend with the response timeout
//! - Give up on a backend that goes silent mid-response (read timeout)
//! - Report every exchange to the observer side channel
//!
//! # Design Decisions
//! - One pooled client shared by all requests
//! - No redirects followed, no decompression: the relay is transparent
//! - Dropping the returned future cancels the backend call

use std::sync::Arc;
use std::time::Instant;

use axum::response::Response;

use crate::config::TimeoutConfig;
use crate::http::error::ForwardingError;
use crate::http::request::OutboundRequest;
use crate::http::response;
use crate::observability::{Exchange, ExchangeObserver, ExchangeOutcome};
use crate::resilience::timeouts::TimeoutPolicy;

/// Issues outbound requests against the backend.
#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    timeouts: TimeoutPolicy,
    observer: Arc<dyn ExchangeObserver>,
}

impl Forwarder {
    pub fn new(
        config: &TimeoutConfig,
        observer: Arc<dyn ExchangeObserver>,
    ) -> Result<Self, reqwest::Error> {
        let timeouts = TimeoutPolicy::from_config(config);
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            timeouts,
            observer,
        })
    }

    /// Send `outbound` and relay whatever the backend answers.
    pub async fn forward(&self, outbound: OutboundRequest) -> Result<Response, ForwardingError> {
        let OutboundRequest {
            method,
            target,
            headers,
            body,
        } = outbound;

        let mut request = self
            .client
            .request(method.clone(), target.clone())
            .headers(headers);
        if let Some(body) = body {
            request = request.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let start = Instant::now();
        let result = match self.timeouts.bound_response(request.send()).await {
            Ok(Ok(backend)) => Ok(backend),
            Ok(Err(e)) => Err(ForwardingError::from(e)),
            Err(timed_out) => Err(ForwardingError::Timeout(timed_out.0)),
        };

        let outcome = match &result {
            Ok(backend) => ExchangeOutcome::Relayed(backend.status()),
            Err(e) => ExchangeOutcome::Failed(e.kind()),
        };
        self.observer.observe(&Exchange {
            method: &method,
            target: &target,
            outcome,
            elapsed: start.elapsed(),
        });

        result.map(response::from_backend)
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}
