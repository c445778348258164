//! Environment variable overrides, applied as the highest config layer.

use crate::ConfigError;
use log::debug;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

const ENV_PREFIX: &str = "DISHBOARD_";
const ENV_HOST: &str = "DISHBOARD_HOST";
const ENV_PORT: &str = "DISHBOARD_PORT";
const ENV_STORE_URL: &str = "DISHBOARD_STORE_URL";
const ENV_ALLOWED_ORIGIN: &str = "DISHBOARD_ALLOWED_ORIGIN";
const ENV_API_URL: &str = "DISHBOARD_API_URL";

/// Snapshot the `DISHBOARD_*` variables of the current process.
pub(super) fn capture_process_env() -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

/// Translate known variables into a config overlay, or `None` when no
/// variable is set.
pub(super) fn environment_overlay(
    vars: &BTreeMap<String, String>,
) -> Result<Option<Value>, ConfigError> {
    let mut server = Map::new();
    let mut store = Map::new();
    let mut client = Map::new();

    if let Some(host) = lookup(vars, ENV_HOST) {
        server.insert("host".to_string(), json!(host));
    }
    if let Some(port) = lookup(vars, ENV_PORT) {
        let port: u16 = port.parse().map_err(|_| ConfigError::InvalidEnv {
            var: ENV_PORT.to_string(),
            value: port.to_string(),
            reason: "expected a port number in 0..=65535",
        })?;
        server.insert("port".to_string(), json!(port));
    }
    if let Some(origin) = lookup(vars, ENV_ALLOWED_ORIGIN) {
        server.insert("allowed_origin".to_string(), json!(origin));
    }
    if let Some(url) = lookup(vars, ENV_STORE_URL) {
        store.insert("url".to_string(), json!(url));
    }
    if let Some(url) = lookup(vars, ENV_API_URL) {
        client.insert("api_url".to_string(), json!(url));
    }

    let mut overlay = Map::new();
    for (section, values) in [("server", server), ("store", store), ("client", client)] {
        if !values.is_empty() {
            debug!(
                "environment overrides section (section={}, keys={})",
                section,
                values.len()
            );
            overlay.insert(section.to_string(), Value::Object(values));
        }
    }
    if overlay.is_empty() {
        return Ok(None);
    }
    Ok(Some(Value::Object(overlay)))
}

/// Read a variable, treating blank values as unset.
fn lookup<'a>(vars: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}
