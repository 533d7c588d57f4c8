//! Core error types for forest-router.
//!
//! Lookups never fail: an unmatched path is `None`, not an error. The
//! [`RouterError`] enum covers what can go wrong at registration and
//! configuration time, where a malformed route should surface early.

use thiserror::Error;

/// The primary error type for forest-router.
#[derive(Error, Debug)]
pub enum RouterError {
    // ── Methods ──────────────────────────────────────────────────────

    /// The method string does not name one of the supported HTTP methods.
    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),

    // ── Registration ─────────────────────────────────────────────────

    /// A wildcard or regex segment could not be compiled.
    #[error("Invalid pattern in segment '{segment}': {source}")]
    InvalidPattern {
        /// The segment as written in the route.
        segment: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// A node already holds a different wildcard/regex child.
    ///
    /// Each trie node has room for exactly one pattern child.
    #[error("Pattern segment '{segment}' conflicts with existing pattern '{existing}'")]
    ConflictingPattern {
        /// The pattern already registered at this position.
        existing: String,
        /// The pattern that was being added.
        segment: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value or route table is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RouterError {
    /// Returns `true` if this error was raised while registering a route.
    pub const fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. } | Self::ConflictingPattern { .. }
        )
    }
}

/// A convenience type alias for `Result<T, RouterError>`.
pub type RouterResult<T> = Result<T, RouterError>;
