//! # forest-router-cli
//!
//! Command-line tooling for forest-router.
//!
//! - [`route_table`] - Route table files (TOML) and building a router from them
//! - [`commands`] - The `resolve`, `check`, and `list` commands

pub mod commands;
pub mod route_table;

pub use commands::{run, Cli, Command};
pub use route_table::{MethodSpec, RouteEntry, RouteTable};
