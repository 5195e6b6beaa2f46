//! CORS policy injection.
//!
//! One immutable policy value, merged into every response leaving the API
//! surface: relayed, preflight and synthesized error responses alike.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;

/// Fixed set of cross-origin headers.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    headers: [(HeaderName, HeaderValue); 3],
}

impl CorsPolicy {
    /// Any origin; the methods and headers the API is called with.
    pub fn standard() -> Self {
        Self {
            headers: [
                (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
                (
                    ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
                ),
                (
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("Content-Type, Authorization"),
                ),
            ],
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(name, value)| (name, value))
    }

    /// Return `response` with the policy headers added, overwriting any
    /// values the backend sent for the same names.
    pub fn apply(&self, mut response: Response) -> Response {
        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
        response
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
