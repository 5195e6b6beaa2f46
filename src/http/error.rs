//! Error boundary for the relay pipeline.
//!
//! Every failure raised while resolving or forwarding becomes a 500 with a
//! JSON body `{"error": <category>, "message": <detail>}`. Nothing escapes
//! as a bare connection failure.

use std::error::Error as StdError;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::routing::ResolutionError;

/// Failure to obtain a response from the backend.
#[derive(Debug, Error)]
pub enum ForwardingError {
    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),

    #[error("connection to backend failed: {}", error_chain(.0))]
    Connect(#[source] reqwest::Error),

    #[error("backend request failed: {}", error_chain(.0))]
    Transport(#[source] reqwest::Error),
}

impl ForwardingError {
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardingError::Timeout(_) => "timeout",
            ForwardingError::Connect(_) => "connect",
            ForwardingError::Transport(_) => "transport",
        }
    }
}

impl From<reqwest::Error> for ForwardingError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            ForwardingError::Connect(e)
        } else {
            ForwardingError::Transport(e)
        }
    }
}

/// Anything that can go wrong between receiving an API request and relaying
/// the backend's answer.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Forwarding(#[from] ForwardingError),
}

impl RelayError {
    /// Human-readable category reported in the `error` field.
    pub fn category(&self) -> &'static str {
        match self {
            RelayError::Resolution(_) => "Failed to resolve backend target",
            RelayError::Forwarding(_) => "Failed to reach backend",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.category(),
            message: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Join an error with its sources, e.g. `error sending request: tcp connect
/// error: Connection refused`.
fn error_chain(error: &dyn StdError) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
