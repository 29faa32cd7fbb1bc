//! Tool result payloads.
//!
//! Payloads are plain JSON values. A failed tool yields `{"error": "..."}`,
//! never a Rust error, so the model can explain the failure to the user.

use serde::Serialize;
use serde_json::{json, Map, Value};

pub fn error_payload(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

pub fn is_error_payload(payload: &Value) -> bool {
    payload
        .as_object()
        .map(|obj| obj.contains_key("error"))
        .unwrap_or(false)
}

/// Serialize a tool output, turning serialization failures into error payloads.
pub fn to_payload<T: Serialize>(output: &T) -> Value {
    serde_json::to_value(output)
        .unwrap_or_else(|e| error_payload(format!("Tool error: failed to encode result: {}", e)))
}

/// Wrap a payload so it is always a JSON object.
///
/// Arrays become `{"items": [...]}` and scalars `{"value": ...}`; objects
/// pass through. Providers that require struct-shaped tool results go
/// through this single rule.
pub fn into_struct(payload: Value) -> Map<String, Value> {
    match payload {
        Value::Object(map) => map,
        Value::Array(items) => {
            let mut map = Map::new();
            map.insert("items".to_string(), Value::Array(items));
            map
        }
        scalar => {
            let mut map = Map::new();
            map.insert("value".to_string(), scalar);
            map
        }
    }
}
