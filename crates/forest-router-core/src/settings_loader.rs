//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON document (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FOREST_ROUTER_USE_CACHE` | `use_cache` |
//! | `FOREST_ROUTER_DECODE_URL_PARAMS` | `decode_url_params` |
//! | `FOREST_ROUTER_MAX_CACHE_SIZE` | `max_cache_size` |
//! | `FOREST_ROUTER_LOG_LEVEL` | `log_level` |
//! | `FOREST_ROUTER_DEBUG` | `debug` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use forest_router_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/router.toml").unwrap();
//! let settings = settings_loader::from_toml_file_with_env("config/router.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::RouterError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys not present in the document keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, RouterError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| RouterError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    from_json_value(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, RouterError> {
    from_toml_str(&read_file(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, RouterError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, RouterError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| RouterError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    from_json_value(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, RouterError> {
    from_json_str(&read_file(path.as_ref(), "JSON")?)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, RouterError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Builds settings from an already-parsed TOML table, e.g. the `[settings]`
/// section of a route table file.
pub fn from_toml_value(value: toml::Value) -> Result<Settings, RouterError> {
    from_json_value(toml_to_json(value), "TOML")
}

/// Applies environment variable overrides to a settings struct.
///
/// Boolean variables accept "true"/"1"/"yes" (any case) as true and anything
/// else as false. An unparsable `FOREST_ROUTER_MAX_CACHE_SIZE` is ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FOREST_ROUTER_USE_CACHE") {
        settings.use_cache = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("FOREST_ROUTER_DECODE_URL_PARAMS") {
        settings.decode_url_params = parse_bool(&val);
    }

    if let Ok(val) = std::env::var("FOREST_ROUTER_MAX_CACHE_SIZE") {
        match val.trim().parse::<usize>() {
            Ok(size) => settings.max_cache_size = size,
            Err(_) => tracing::warn!(value = %val, "ignoring invalid FOREST_ROUTER_MAX_CACHE_SIZE"),
        }
    }

    if let Ok(val) = std::env::var("FOREST_ROUTER_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("FOREST_ROUTER_DEBUG") {
        settings.debug = parse_bool(&val);
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_bool(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn read_file(path: &Path, format: &str) -> Result<String, RouterError> {
    std::fs::read_to_string(path).map_err(|e| {
        RouterError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

/// Merges the document over the serialized defaults and deserializes the result.
fn from_json_value(value: serde_json::Value, format: &str) -> Result<Settings, RouterError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        RouterError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        RouterError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (canonical_key(k), toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Maps the camelCase option spellings onto the field names so that a
/// document using them overrides the defaults instead of sitting beside them.
fn canonical_key(key: String) -> String {
    match key.as_str() {
        "useCache" => "use_cache".to_string(),
        "decodeUrlParams" => "decode_url_params".to_string(),
        "maxCacheSize" => "max_cache_size".to_string(),
        _ => key,
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let key = canonical_key(key);
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
