//! Route registration and resolution.
//!
//! This module provides:
//!
//! - [`segment`]: segment classification (`literal`, `:param`, `*`/`prefix*`,
//!   regex) and path normalization
//! - [`tree`]: the per-method segment trie with backtracking matching
//! - [`cache`]: the bounded LRU memo of lookup results
//! - [`router`]: per-method orchestration of static routes, cache, and tree
//!
//! # Examples
//!
//! ```
//! use forest_router_http::routing::router::Router;
//! use forest_router_core::Method;
//!
//! let mut router = Router::new();
//! router.get("/files/*", "files").unwrap();
//! router.get("/a/:x/b", "param").unwrap();
//! router.get("/a/lit/c", "literal").unwrap();
//!
//! // Wildcards consume the rest of the path.
//! let m = router.find(Method::Get, "/files/docs/readme.md").unwrap();
//! assert_eq!(m.params.get("*").unwrap(), "docs/readme.md");
//!
//! // A literal branch that dead-ends falls back to the param branch.
//! let m = router.find(Method::Get, "/a/lit/b").unwrap();
//! assert_eq!(m.handler, "param");
//! assert_eq!(m.params.get("x").unwrap(), "lit");
//! ```

pub mod cache;
pub mod router;
pub mod segment;
pub mod tree;
