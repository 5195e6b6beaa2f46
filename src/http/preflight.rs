//! Preflight short-circuit.
//!
//! Browsers send `OPTIONS` before a cross-origin call and expect a fast
//! answer. It is produced locally; the backend is never contacted.

use axum::body::Body;
use axum::http::{Method, StatusCode};
use axum::response::Response;

pub fn is_preflight(method: &Method) -> bool {
    method == Method::OPTIONS
}

/// 200 with an empty body. CORS headers are merged by the caller like on
/// every other exit.
pub fn answer() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    response
}
