//! Serde helpers for backend fields whose wire type drifts between callers.
//!
//! The settings store hands back list fields either as JSON arrays or as the
//! JSON text of an array, flags as `true`/`1`/`"1"`, and amounts as numbers or
//! numeric strings. None of these helpers fail on a bad value; they fall back
//! to the empty/zero value instead.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts `["a","b"]`, `"[\"a\",\"b\"]"` or `null`. Anything unparseable
/// becomes an empty list.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(parse_string_list).unwrap_or_default())
}

pub fn parse_string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(scalar_to_string).collect(),
        Value::String(encoded) => match serde_json::from_str::<Value>(&encoded) {
            Ok(Value::Array(items)) => items.into_iter().filter_map(scalar_to_string).collect(),
            _ => {
                tracing::debug!("Discarding malformed list setting: {encoded:?}");
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts `true`, `1`, `"1"` and `"true"` as set; everything else is unset.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Accepts a JSON number or a numeric string. Missing or garbage is `None`.
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| value_to_f64(&v)))
}

/// Treats an explicit `null` like a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
