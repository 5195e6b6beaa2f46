//! Request identification and outbound request construction.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for tracing
//! - Derive the outbound request from the inbound one
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Method, headers and body pass through untouched apart from hop-by-hop headers
//! - Bodies are streamed, never buffered

use axum::body::{Body, HttpBody};
use axum::http::header::{CONTENT_LENGTH, HOST};
use axum::http::{HeaderMap, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;

use crate::http::response::strip_hop_by_hop;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Produces a fresh UUID v4 for every inbound request.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRelayRequestId;

impl MakeRequestId for MakeRelayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID header, if any.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Methods that conventionally carry no payload.
pub fn carries_body(method: &Method) -> bool {
    !(method == Method::GET
        || method == Method::HEAD
        || method == Method::TRACE
        || method == Method::CONNECT)
}

/// The request issued against the backend.
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    pub target: Url,
    pub headers: HeaderMap,
    pub body: Option<Body>,
}

impl OutboundRequest {
    /// Build the outbound request for `target` from an inbound request.
    pub fn from_incoming(request: Request<Body>, target: Url) -> Self {
        let (parts, body) = request.into_parts();

        let mut headers = strip_hop_by_hop(&parts.headers);
        headers.remove(HOST);

        let body = if !carries_body(&parts.method) {
            headers.remove(CONTENT_LENGTH);
            None
        } else if body.size_hint().exact() == Some(0) {
            None
        } else {
            Some(body)
        };

        Self {
            method: parts.method,
            target,
            headers,
            body,
        }
    }
}
