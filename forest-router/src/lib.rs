//! # forest-router
//!
//! Resolves `(method, path)` pairs to registered handlers and extracts path
//! parameters. Routes may contain literal segments, named parameters
//! (`:id`), wildcards (`*`, `prefix*`) and regex segments.
//!
//! This is the meta-crate that re-exports the sub-crates. You can depend on
//! `forest-router` to get everything, or depend on individual crates.
//!
//! ```
//! use forest_router::prelude::*;
//!
//! let mut router = Router::with_settings(&Settings::default().with_decode_url_params(true));
//! router.get("/users/:id", "show-user").unwrap();
//!
//! let m = router.find(Method::Get, "/users/jane%20doe").unwrap();
//! assert_eq!(m.handler, "show-user");
//! assert_eq!(m.params.get("id").unwrap(), "jane doe");
//! ```

/// Core types: methods, settings, errors, logging.
pub use forest_router_core as core;

/// Segment trie, result cache, and router.
pub use forest_router_http as http;

/// Route table files and the command-line interface.
#[cfg(feature = "cli")]
pub use forest_router_cli as cli;

pub use tracing;
pub use tracing_subscriber;

/// The types needed to register and resolve routes.
pub mod prelude {
    pub use forest_router_core::{Method, RouterError, RouterResult, Settings};
    pub use forest_router_http::{IntoMethods, Params, RouteMatch, Router, SharedRouter};
}
