//! JSON backend for Cogwheel
//!
//! Documents are JSON objects. Key order is preserved in both directions;
//! comments cannot be represented and are dropped when encoding.

pub mod convert;

use cogwheel_core::{
    CogwheelError, ConfigSerializer, ConfigSerializerBuilder, Format, Result, Section,
};
use serde::Serialize;
use serde_json::ser::{CompactFormatter, PrettyFormatter};
use serde_json::Value as JsonValue;
use tracing::trace;

pub use convert::{from_json, object_to_section, section_to_json, to_json};

const NAME: &str = "JSON";

/// JSON encoding options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFormat {
    /// Write one value per line, indented
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set
    pub indent: usize,
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 2,
        }
    }
}

impl JsonFormat {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }

    pub fn with_indent(indent: usize) -> Self {
        Self {
            pretty: true,
            indent,
        }
    }

    fn write(&self, value: &JsonValue) -> serde_json::Result<Vec<u8>> {
        let mut out = Vec::new();
        if self.pretty {
            let indent = vec![b' '; self.indent];
            let mut serializer =
                serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
            value.serialize(&mut serializer)?;
        } else {
            let mut serializer = serde_json::Serializer::with_formatter(&mut out, CompactFormatter);
            value.serialize(&mut serializer)?;
        }
        Ok(out)
    }
}

impl Format for JsonFormat {
    fn name(&self) -> &str {
        NAME
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn encode(&self, section: &Section) -> Result<String> {
        let object = JsonValue::Object(section_to_json(section, "")?);
        let bytes = self
            .write(&object)
            .map_err(|e| CogwheelError::Format(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CogwheelError::Format(e.to_string()))
    }

    fn decode(&self, input: &str) -> Result<Section> {
        let value: JsonValue =
            serde_json::from_str(input).map_err(|e| CogwheelError::parse(NAME, e.to_string()))?;
        match value {
            JsonValue::Object(object) => {
                trace!(keys = object.len(), "Decoded JSON document");
                Ok(object_to_section(object))
            }
            _ => Err(CogwheelError::parse(
                NAME,
                "expected a JSON object at the top level",
            )),
        }
    }
}

/// Serializer writing pretty JSON with default options
pub fn serializer() -> ConfigSerializer<JsonFormat> {
    ConfigSerializer::new(JsonFormat::default())
}

/// Builder for a pretty JSON serializer
pub fn builder() -> ConfigSerializerBuilder<JsonFormat> {
    ConfigSerializer::builder(JsonFormat::default())
}
