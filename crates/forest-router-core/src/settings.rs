//! Router settings.
//!
//! [`Settings`] is fixed for a router's lifetime; resetting a router rebuilds
//! its per-method tables from the same settings.
//!
//! The routing options also accept their camelCase spellings (`useCache`,
//! `decodeUrlParams`, `maxCacheSize`) when deserialized.

use serde::{Deserialize, Serialize};

/// Default capacity of each per-method result cache.
pub const DEFAULT_MAX_CACHE_SIZE: usize = 1000;

/// The complete set of router settings.
///
/// # Examples
///
/// ```
/// use forest_router_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.use_cache);
/// assert!(!settings.decode_url_params);
/// assert_eq!(settings.max_cache_size, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ── Routing ──────────────────────────────────────────────────────

    /// Whether successful tree lookups are memoized per method.
    #[serde(alias = "useCache")]
    pub use_cache: bool,
    /// Whether captured parameter values are percent-decoded.
    #[serde(alias = "decodeUrlParams")]
    pub decode_url_params: bool,
    /// Capacity of each per-method result cache.
    #[serde(alias = "maxCacheSize")]
    pub max_cache_size: usize,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter directive (e.g. "info", "`forest_router_http=trace`").
    pub log_level: String,
    /// Pretty, human-readable logs instead of JSON lines.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_cache: true,
            decode_url_params: false,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            log_level: "info".to_string(),
            debug: false,
        }
    }
}

impl Settings {
    /// Returns a copy with caching switched on or off.
    #[must_use]
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Returns a copy with percent-decoding of captured values switched on or off.
    #[must_use]
    pub fn with_decode_url_params(mut self, decode: bool) -> Self {
        self.decode_url_params = decode;
        self
    }

    /// Returns a copy with the given per-method cache capacity.
    #[must_use]
    pub fn with_max_cache_size(mut self, size: usize) -> Self {
        self.max_cache_size = size;
        self
    }
}
