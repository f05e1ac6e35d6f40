//! Redaction of sensitive arguments before they reach the logs

use serde_json::Value;

/// Replacement for redacted values
pub const REDACTED: &str = "[REDACTED]";

/// Key fragments that mark a value as sensitive (matched case-insensitively)
const SENSITIVE_KEYS: &[&str] = &["password", "pass", "secret", "token", "key", "api_key", "apikey"];

/// Copy `arguments` with every sensitive leaf replaced by [`REDACTED`].
///
/// Nested objects and arrays are walked; a sensitive key hides its whole value.
pub fn redact_arguments(arguments: &Value) -> Value {
    match arguments {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if is_sensitive(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_arguments(value)
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_arguments).collect()),
        other => other.clone(),
    }
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|fragment| key.contains(fragment))
}
