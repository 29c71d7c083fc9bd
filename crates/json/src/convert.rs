//! Conversions between `serde_json` values and the document tree

use cogwheel_core::{CogwheelError, Number, Result, Section, Value};
use serde_json::{Map, Value as JsonValue};

const FORMAT: &str = "JSON";

/// Convert a tree value into JSON.
///
/// Integers outside the `i64`/`u64` range become floats; non-finite floats
/// cannot be represented and are rejected.
pub fn to_json(value: &Value, path: &str) -> Result<JsonValue> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => JsonValue::Number(to_json_number(*n, path)?),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Array(items) => {
            let mut array = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                array.push(to_json(item, &child_path(path, &i.to_string()))?);
            }
            JsonValue::Array(array)
        }
        Value::Map(section) => JsonValue::Object(section_to_json(section, path)?),
    })
}

/// Convert a section into a JSON object, keeping key order
pub fn section_to_json(section: &Section, path: &str) -> Result<Map<String, JsonValue>> {
    let mut object = Map::new();
    for (key, value) in section.iter() {
        object.insert(key.to_string(), to_json(value, &child_path(path, key))?);
    }
    Ok(object)
}

fn to_json_number(number: Number, path: &str) -> Result<serde_json::Number> {
    if let Some(i) = number.as_i64() {
        return Ok(i.into());
    }
    if let Some(u) = number.as_u64() {
        return Ok(u.into());
    }
    serde_json::Number::from_f64(number.as_f64()).ok_or_else(|| CogwheelError::UnsupportedValue {
        format: FORMAT.to_string(),
        key: path.to_string(),
        kind: format!("non-finite number {}", number),
    })
}

/// Convert JSON into a tree value
pub fn from_json(value: JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => Value::Number(from_json_number(&n)),
        JsonValue::String(s) => Value::String(s),
        JsonValue::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        JsonValue::Object(object) => Value::Map(object_to_section(object)),
    }
}

/// Convert a JSON object into a section, keeping key order
pub fn object_to_section(object: Map<String, JsonValue>) -> Section {
    object
        .into_iter()
        .map(|(key, value)| (key, from_json(value)))
        .collect()
}

fn from_json_number(number: &serde_json::Number) -> Number {
    if let Some(i) = number.as_i64() {
        Number::from(i)
    } else if let Some(u) = number.as_u64() {
        Number::from(u)
    } else {
        Number::Float(number.as_f64().unwrap_or(f64::NAN))
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}
