//! Command-line interface.
//!
//! ```text
//! forest-router --routes routes.toml resolve GET /users/42
//! forest-router --routes routes.toml check
//! forest-router --routes routes.toml list [METHOD]
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use forest_router_core::logging::lookup_span;
use forest_router_core::{Method, RouterError, RouterResult};
use forest_router_http::Params;

use crate::route_table::RouteTable;

#[derive(Debug, Parser)]
#[command(name = "forest-router")]
#[command(about = "Resolve request paths against a route table", long_about = None)]
pub struct Cli {
    /// Route table file (TOML).
    #[arg(short, long, default_value = "routes.toml")]
    pub routes: PathBuf,

    /// Log filter directive; overrides the route table's `log_level`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Human-readable logs instead of JSON lines.
    #[arg(long)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a method and path to a route
    Resolve {
        /// HTTP method, e.g. GET
        method: String,
        /// Request path, e.g. /users/42
        path: String,
    },
    /// Validate the route table and report route counts per method
    Check,
    /// List registered routes
    List {
        /// Only list routes for this method
        method: Option<String>,
    },
}

/// JSON printed by `resolve`.
#[derive(Debug, Serialize)]
struct Resolution<'a> {
    method: Method,
    path: &'a str,
    handler: Option<&'a str>,
    params: Option<&'a Params>,
}

/// Runs `command` against `table`, writing results to `out`.
///
/// Returns `Ok(false)` when `resolve` finds no route, so the caller can exit
/// with a failure status.
pub fn run(table: &RouteTable, command: &Command, out: &mut impl Write) -> RouterResult<bool> {
    let mut router = table.build_router()?;

    match command {
        Command::Resolve { method, path } => {
            let method: Method = method.parse()?;
            let span = lookup_span(method, path);
            let _guard = span.enter();

            let found = router.find(method, path);
            tracing::info!(matched = found.is_some(), "resolved");

            let resolution = Resolution {
                method,
                path,
                handler: found.as_ref().map(|m| m.handler.as_str()),
                params: found.as_ref().map(|m| &m.params),
            };
            let json = serde_json::to_string_pretty(&resolution).map_err(|e| {
                RouterError::ConfigurationError(format!("Failed to serialize result: {e}"))
            })?;
            writeln!(out, "{json}")?;
            Ok(found.is_some())
        }
        Command::Check => {
            for method in Method::ALL {
                let count = router.routes(method).len();
                if count > 0 {
                    writeln!(out, "{method:<8} {count}")?;
                }
            }
            writeln!(out, "ok: {} routes", router.len())?;
            Ok(true)
        }
        Command::List { method } => {
            let methods = match method {
                Some(m) => vec![m.parse::<Method>()?],
                None => Method::ALL.to_vec(),
            };
            for method in methods {
                for route in router.routes(method) {
                    writeln!(out, "{method:<8} {route}")?;
                }
            }
            Ok(true)
        }
    }
}
