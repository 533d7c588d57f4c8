//! # forest-router-http
//!
//! Route matching for forest-router. Given routes registered per HTTP
//! method, resolves a `(method, path)` pair to its handler and the
//! parameters captured from the path.
//!
//! See [`routing`] for the path grammar and the matching rules.

pub mod routing;

pub use routing::router::{IntoMethods, RouteMatch, Router, SharedRouter};
pub use routing::tree::{Leaf, Params, Tree};
