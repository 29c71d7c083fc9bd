//! Conversions between `serde_yaml` values and the document tree

use cogwheel_core::{CogwheelError, Number, Result, Section, Value};
use serde_yaml::{Mapping, Value as YamlValue};

pub(crate) const FORMAT: &str = "YAML";

/// Convert a tree value into a `serde_yaml` value
pub fn to_yaml(value: &Value) -> YamlValue {
    match value {
        Value::Null => YamlValue::Null,
        Value::Bool(b) => YamlValue::Bool(*b),
        Value::Number(n) => YamlValue::Number(to_yaml_number(*n)),
        Value::String(s) => YamlValue::String(s.clone()),
        Value::Array(items) => YamlValue::Sequence(items.iter().map(to_yaml).collect()),
        Value::Map(section) => YamlValue::Mapping(section_to_mapping(section)),
    }
}

pub fn section_to_mapping(section: &Section) -> Mapping {
    let mut mapping = Mapping::new();
    for (key, value) in section.iter() {
        mapping.insert(YamlValue::String(key.to_string()), to_yaml(value));
    }
    mapping
}

fn to_yaml_number(number: Number) -> serde_yaml::Number {
    if let Some(i) = number.as_i64() {
        i.into()
    } else if let Some(u) = number.as_u64() {
        u.into()
    } else {
        number.as_f64().into()
    }
}

/// Convert a `serde_yaml` value into a tree value.
///
/// Tags are dropped and scalar mapping keys are turned into strings.
pub fn from_yaml(value: YamlValue) -> Result<Value> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => Value::Number(from_yaml_number(&n)),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>>>()?,
        ),
        YamlValue::Mapping(mapping) => Value::Map(mapping_to_section(mapping)?),
        YamlValue::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

pub fn mapping_to_section(mapping: Mapping) -> Result<Section> {
    let mut section = Section::new();
    for (key, value) in mapping {
        section.insert(key_to_string(key)?, from_yaml(value)?);
    }
    Ok(section)
}

fn key_to_string(key: YamlValue) -> Result<String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => key_to_string(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(CogwheelError::parse(
            FORMAT,
            "mapping keys must be scalars",
        )),
    }
}

fn from_yaml_number(number: &serde_yaml::Number) -> Number {
    if let Some(i) = number.as_i64() {
        Number::from(i)
    } else if let Some(u) = number.as_u64() {
        Number::from(u)
    } else {
        Number::Float(number.as_f64().unwrap_or(f64::NAN))
    }
}
