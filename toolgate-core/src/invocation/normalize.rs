//! Normalization of operation payloads into plain JSON

use serde::Serialize;
use serde_json::Value;

/// Serialize any payload into plain JSON.
///
/// Payloads that cannot be represented (maps with non-string keys, types whose
/// `Serialize` impl errors) become a string naming the type instead of failing
/// the call. Non-finite floats serialize as `null`.
pub fn to_plain_json<T: Serialize + ?Sized>(value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(value) => value,
        Err(e) => {
            let type_name = std::any::type_name::<T>();
            tracing::debug!(type_name, error = %e, "Payload is not representable as JSON");
            Value::String(format!("<unserializable {type_name}>"))
        }
    }
}

/// Whether a payload carries nothing worth echoing into the text content
pub fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
