//! Pure response handling: body parsing and the non-empty result policy.

use serde_json::Value;

use super::error::{FetchError, Result};

/// Whether a parsed body counts as "no results".
///
/// Empty arrays, empty strings and `null` are empty. Objects (even `{}`),
/// numbers and booleans are not.
pub fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => false,
    }
}

/// Rejects empty results unless `allow_empty_result` is set.
pub fn ensure_non_empty(value: Value, allow_empty_result: bool) -> Result<Value> {
    if !allow_empty_result && is_empty_result(&value) {
        return Err(FetchError::EmptyResult);
    }
    Ok(value)
}

/// Parses a 2xx response body and applies the non-empty policy.
pub fn parse_body(body: &[u8], allow_empty_result: bool) -> Result<Value> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    ensure_non_empty(value, allow_empty_result)
}
