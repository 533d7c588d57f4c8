//! Logging integration for forest-router.
//!
//! Library code only emits [`tracing`] events; binaries call
//! [`setup_logging`] (or [`init_logging`] when command-line flags override
//! the configuration) once to install a subscriber.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Filter used when a configured directive does not parse.
const FALLBACK_FILTER: &str = "info";

/// Output format of the installed subscriber. Events always go to stderr
/// so that command output on stdout stays machine-readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable events with file and line.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// `Pretty` in debug mode, `Json` otherwise.
    pub const fn for_settings(settings: &Settings) -> Self {
        if settings.debug {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Parses a filter directive such as `"debug"` or `"forest_router_http=trace"`,
/// falling back to `"info"`.
pub fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Installs the global subscriber from `settings.log_level` and
/// `settings.debug`.
///
/// Installing a second subscriber is silently ignored.
pub fn setup_logging(settings: &Settings) {
    init_logging(&settings.log_level, LogFormat::for_settings(settings));
}

/// Installs the global subscriber with an explicit filter directive and
/// format. Returns `false` if a subscriber was already installed.
pub fn init_logging(directive: &str, format: LogFormat) -> bool {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter(directive))
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}

/// Creates a tracing span for one lookup.
///
/// # Examples
///
/// ```
/// use forest_router_core::logging::lookup_span;
/// use forest_router_core::Method;
///
/// let span = lookup_span(Method::Get, "/users/42");
/// let _guard = span.enter();
/// tracing::info!("resolving");
/// ```
pub fn lookup_span(method: crate::Method, path: &str) -> tracing::Span {
    tracing::debug_span!("lookup", method = %method, path = path)
}
