//! Path classification.
//!
//! # Responsibilities
//! - Decide whether a request belongs to the API surface
//! - Everything else falls through to the static asset fallback
//!
//! # Design Decisions
//! - Literal prefix match on the path (case-sensitive, segment-unaware)
//! - Pure function of the path string, no regex

use axum::body::Body;
use axum::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Classifies paths as API traffic by their leading prefix.
#[derive(Debug, Clone)]
pub struct ApiPathClassifier {
    prefix: String,
}

impl ApiPathClassifier {
    /// Create a classifier for the given public prefix (e.g. `/api`).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The public prefix this classifier matches.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true when `path` is on the API surface.
    pub fn is_api_path(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

impl Matcher for ApiPathClassifier {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.is_api_path(req.uri().path())
    }
}
