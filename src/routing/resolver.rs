//! Backend target resolution.
//!
//! # Responsibilities
//! - Swap the public prefix for the backend prefix
//! - Join the result onto the backend origin
//! - Carry the query string over unchanged
//!
//! # Design Decisions
//! - Single leading-anchor replacement, never a global substring replace
//! - Built once from config, immutable at runtime (thread-safe without locks)
//! - A path outside the public prefix is an error, not a guess
//! - Dot segments are refused: a target never leaves the backend prefix

use thiserror::Error;
use url::Url;

use crate::config::ProxyConfig;

/// Failure to compute a backend URL.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("path {path:?} does not start with the public prefix {prefix:?}")]
    PrefixMismatch { path: String, prefix: String },

    #[error("resolved target {target:?} is not a valid URL: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("path {path:?} escapes the backend prefix {prefix:?}")]
    EscapesPrefix { path: String, prefix: String },
}

/// Maps public API paths onto the backend origin.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    origin: String,
    public_prefix: String,
    backend_prefix: String,
    /// `backend_prefix` as it appears in a parsed URL path.
    backend_root: String,
}

impl TargetResolver {
    /// Create a resolver. A trailing `/` on the origin is dropped.
    pub fn new(
        origin: impl Into<String>,
        public_prefix: impl Into<String>,
        backend_prefix: impl Into<String>,
    ) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        let backend_prefix = backend_prefix.into();
        let backend_root = Url::parse(&format!("{}{}", origin, backend_prefix))
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| backend_prefix.clone());
        Self {
            origin,
            public_prefix: public_prefix.into(),
            backend_prefix,
            backend_root,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(
            config.backend_origin.clone(),
            config.public_prefix.clone(),
            config.backend_prefix.clone(),
        )
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Compute the backend URL for an inbound path and query.
    pub fn resolve(&self, path: &str, query: Option<&str>) -> Result<Url, ResolutionError> {
        let rest = path
            .strip_prefix(self.public_prefix.as_str())
            .ok_or_else(|| ResolutionError::PrefixMismatch {
                path: path.to_string(),
                prefix: self.public_prefix.clone(),
            })?;

        let escapes = || ResolutionError::EscapesPrefix {
            path: path.to_string(),
            prefix: self.backend_prefix.clone(),
        };

        // The first piece is glued onto the last prefix segment.
        if rest.split(['/', '\\']).skip(1).any(is_dot_segment) {
            return Err(escapes());
        }

        let mut target = format!("{}{}{}", self.origin, self.backend_prefix, rest);
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }

        let url = Url::parse(&target)
            .map_err(|source| ResolutionError::InvalidTarget { target, source })?;
        if !url.path().starts_with(self.backend_root.as_str()) {
            return Err(escapes());
        }
        Ok(url)
    }
}

/// `.` or `..`, in any mix of literal and `%2e` spellings. URL parsers drop
/// tabs and newlines before looking, so those are ignored too.
fn is_dot_segment(segment: &str) -> bool {
    let segment: String = segment
        .chars()
        .filter(|c| !matches!(*c, '\t' | '\n' | '\r'))
        .collect::<String>()
        .to_ascii_lowercase()
        .replace("%2e", ".");
    segment == "." || segment == ".."
}
