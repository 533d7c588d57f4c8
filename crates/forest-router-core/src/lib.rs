//! # forest-router-core
//!
//! Core types for the forest-router workspace. This crate carries no routing
//! logic of its own and provides the foundation the other crates build on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`method`] - The closed set of HTTP methods a router keeps tables for
//! - [`settings`] - Router settings with defaults
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod method;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{RouterError, RouterResult};
pub use method::Method;
pub use settings::Settings;
