//! Schema validation helpers for dishboard JSON5 configuration.
//!
//! `null` is accepted for every leaf: it resets the key to its default when
//! layers are merged.

use crate::ConfigError;
use serde_json::{Map, Value};

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(
        map,
        &["$schema", "server", "store", "broadcast", "client"],
        layer,
        "",
    )?;

    if let Some(value) = present(map, "$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = present(map, "server") {
        validate_server(value, layer, "server")?;
    }
    if let Some(value) = present(map, "store") {
        validate_store(value, layer, "store")?;
    }
    if let Some(value) = present(map, "broadcast") {
        let map = expect_object(value, layer, "broadcast")?;
        ensure_allowed_keys(map, &["capacity"], layer, "broadcast")?;
        if let Some(value) = present(map, "capacity") {
            expect_u64(value, layer, "broadcast.capacity")?;
        }
    }
    if let Some(value) = present(map, "client") {
        validate_client(value, layer, "client")?;
    }
    Ok(())
}

/// Validate the "server" block.
fn validate_server(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["host", "port", "allowed_origin"], layer, path)?;
    if let Some(value) = present(map, "host") {
        expect_string(value, layer, &join_path(path, "host"))?;
    }
    if let Some(value) = present(map, "port") {
        let port_path = join_path(path, "port");
        expect_u64(value, layer, &port_path)?;
        if value.as_u64().is_none_or(|port| port > u64::from(u16::MAX)) {
            return Err(invalid_field(layer, &port_path, "expected port in 0..=65535"));
        }
    }
    if let Some(value) = present(map, "allowed_origin") {
        expect_string(value, layer, &join_path(path, "allowed_origin"))?;
    }
    Ok(())
}

/// Validate the "store" block.
fn validate_store(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["url", "seed_path"], layer, path)?;
    if let Some(value) = present(map, "url") {
        expect_string(value, layer, &join_path(path, "url"))?;
    }
    if let Some(value) = present(map, "seed_path") {
        expect_string(value, layer, &join_path(path, "seed_path"))?;
    }
    Ok(())
}

/// Validate the "client" block, including the nested reconnect policy.
fn validate_client(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["api_url", "reconnect", "notice_limit"], layer, path)?;
    if let Some(value) = present(map, "api_url") {
        expect_string(value, layer, &join_path(path, "api_url"))?;
    }
    if let Some(value) = present(map, "notice_limit") {
        expect_u64(value, layer, &join_path(path, "notice_limit"))?;
    }
    if let Some(value) = present(map, "reconnect") {
        let reconnect_path = join_path(path, "reconnect");
        let reconnect = expect_object(value, layer, &reconnect_path)?;
        ensure_allowed_keys(
            reconnect,
            &["max_attempts", "delay_ms"],
            layer,
            &reconnect_path,
        )?;
        for key in ["max_attempts", "delay_ms"] {
            if let Some(value) = present(reconnect, key) {
                expect_u64(value, layer, &join_path(&reconnect_path, key))?;
            }
        }
    }
    Ok(())
}

/// Look up a key, skipping explicit nulls.
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.as_str().is_some() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected string"))
    }
}

/// Expect a non-negative JSON integer or return a typed error.
fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{normalized_path}"),
        message: message.to_string(),
    }
}
