//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → matcher.rs (API surface or static assets?)
//!     → resolver.rs (public prefix → backend prefix on the backend origin)
//!     → Return: backend URL or ResolutionError
//! ```
//!
//! # Design Decisions
//! - Built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always resolves to the same target

pub mod matcher;
pub mod resolver;

pub use matcher::{ApiPathClassifier, Matcher};
pub use resolver::{ResolutionError, TargetResolver};
