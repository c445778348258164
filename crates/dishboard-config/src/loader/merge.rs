//! JSON merge helpers for layered configuration.

use serde_json::{Map, Value};

/// Merge an overlay layer into the accumulated config.
///
/// Objects merge key by key; any other value replaces the base. An explicit
/// `null` in the overlay drops the key so that a higher layer can restore the
/// built-in default (e.g. `allowed_origin: null`).
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    let Value::Object(overlay_map) = overlay else {
        *base = overlay.clone();
        return;
    };
    if !base.is_object() {
        *base = Value::Object(Map::new());
    }
    let Some(base_map) = base.as_object_mut() else {
        return;
    };
    for (key, value) in overlay_map {
        if value.is_null() {
            base_map.remove(key);
            continue;
        }
        if value.is_object() {
            let slot = base_map
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            merge_json_values(slot, value);
        } else {
            base_map.insert(key.clone(), value.clone());
        }
    }
}
