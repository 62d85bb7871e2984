//! Forgiving deserializers for scalar fields written by a model.
//!
//! Models regularly emit `"id": 1` where a string is expected. These helpers
//! accept strings, numbers and booleans and store them as `String`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Stringify a scalar JSON value. Returns `None` for null, arrays and objects.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Deserialize a string, number or boolean into a `String`.
///
/// # Errors
///
/// Fails on null, arrays and objects.
pub fn de_string_like<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value)
        .ok_or_else(|| D::Error::custom(format!("expected a string or number, got {value}")))
}

/// Like [`de_string_like`] for every element of a list.
pub fn de_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .iter()
        .map(|v| {
            scalar_to_string(v)
                .ok_or_else(|| D::Error::custom(format!("expected a string list element, got {v}")))
        })
        .collect()
}
