//! Route table files.
//!
//! A route table is a TOML document with an optional `[settings]` table and
//! a list of `[[routes]]`:
//!
//! ```toml
//! [settings]
//! use_cache = true
//! decode_url_params = true
//!
//! [[routes]]
//! method = "GET"
//! path = "/users/:id"
//! name = "user-detail"
//!
//! [[routes]]
//! method = ["PUT", "PATCH"]
//! path = "/users/:id"
//! name = "user-update"
//! ```
//!
//! The route `name` is the handler stored in the router. When omitted it
//! defaults to the path.

use std::path::Path;

use serde::Deserialize;

use forest_router_core::{settings_loader, Method, RouterError, RouterResult, Settings};
use forest_router_http::Router;

/// One method or a list of methods.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MethodSpec {
    One(Method),
    Many(Vec<Method>),
}

impl MethodSpec {
    /// The listed methods.
    pub fn methods(&self) -> Vec<Method> {
        match self {
            Self::One(method) => vec![*method],
            Self::Many(methods) => methods.clone(),
        }
    }
}

/// A single `[[routes]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    pub method: MethodSpec,
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl RouteEntry {
    /// The handler name registered for this entry.
    pub fn handler(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.path.clone())
    }
}

#[derive(Debug, Deserialize)]
struct RawRouteTable {
    #[serde(default)]
    settings: Option<toml::Value>,
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

/// A parsed route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    pub settings: Settings,
    pub routes: Vec<RouteEntry>,
}

impl RouteTable {
    /// Parses a route table from TOML. Settings missing from the document
    /// keep their defaults.
    pub fn from_toml_str(toml_str: &str) -> RouterResult<Self> {
        let raw: RawRouteTable = toml::from_str(toml_str).map_err(|e| {
            RouterError::ConfigurationError(format!("Failed to parse route table: {e}"))
        })?;

        let settings = match raw.settings {
            Some(value) => settings_loader::from_toml_value(value)?,
            None => Settings::default(),
        };

        Ok(Self {
            settings,
            routes: raw.routes,
        })
    }

    /// Reads a route table file and applies `FOREST_ROUTER_*` environment
    /// overrides to its settings.
    pub fn load(path: impl AsRef<Path>) -> RouterResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RouterError::ConfigurationError(format!(
                "Failed to read route table '{}': {e}",
                path.display()
            ))
        })?;
        let mut table = Self::from_toml_str(&content)?;
        settings_loader::apply_env_overrides(&mut table.settings);
        tracing::debug!(path = %path.display(), routes = table.routes.len(), "route table loaded");
        Ok(table)
    }

    /// Builds a router holding every route of this table, with route names
    /// as handlers.
    ///
    /// # Errors
    ///
    /// Fails on the first route that cannot be registered; the error names
    /// the offending path.
    pub fn build_router(&self) -> RouterResult<Router<String>> {
        let mut router = Router::with_settings(&self.settings);
        for entry in &self.routes {
            let methods = entry.method.methods();
            if methods.is_empty() {
                return Err(RouterError::ConfigurationError(format!(
                    "Route '{}' names no methods",
                    entry.path
                )));
            }
            router
                .add(methods, &entry.path, entry.handler())
                .map_err(|e| {
                    if e.is_registration_error() {
                        RouterError::ConfigurationError(format!("Route '{}': {e}", entry.path))
                    } else {
                        e
                    }
                })?;
        }
        Ok(router)
    }
}
