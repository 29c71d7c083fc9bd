//! YAML backend for Cogwheel
//!
//! Documents are written in block style with entry comments as `#` lines.
//! Reading goes through `serde_yaml`, after which comment lines and inline
//! comments are recovered from the source and attached to their entries.

mod comments;
pub mod convert;
mod emitter;

use cogwheel_core::{CogwheelError, ConfigSerializer, ConfigSerializerBuilder, Format, Result, Section};
use convert::FORMAT;
use emitter::Emitter;
use serde_yaml::Value as YamlValue;
use tracing::trace;

pub use convert::{from_yaml, mapping_to_section, section_to_mapping, to_yaml};

/// YAML encoding options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlFormat {
    /// Spaces per nesting level
    pub indent: usize,
    /// Write entry comments and recover them when reading
    pub comments: bool,
}

impl Default for YamlFormat {
    fn default() -> Self {
        Self {
            indent: 2,
            comments: true,
        }
    }
}

impl YamlFormat {
    pub fn with_indent(indent: usize) -> Self {
        Self {
            indent,
            ..Self::default()
        }
    }

    pub fn without_comments() -> Self {
        Self {
            comments: false,
            ..Self::default()
        }
    }
}

impl Format for YamlFormat {
    fn name(&self) -> &str {
        FORMAT
    }

    fn extensions(&self) -> &[&str] {
        &["yml", "yaml"]
    }

    fn encode(&self, section: &Section) -> Result<String> {
        Ok(Emitter::new(self.indent, self.comments).document(section))
    }

    fn decode(&self, input: &str) -> Result<Section> {
        if is_blank(input) {
            return Ok(Section::new());
        }
        let value: YamlValue =
            serde_yaml::from_str(input).map_err(|e| CogwheelError::parse(FORMAT, e.to_string()))?;
        let mut section = match untag(value) {
            YamlValue::Null => Section::new(),
            YamlValue::Mapping(mapping) => mapping_to_section(mapping)?,
            _ => {
                return Err(CogwheelError::parse(
                    FORMAT,
                    "expected a YAML mapping at the top level",
                ))
            }
        };
        if self.comments {
            comments::recover(input, &mut section);
        }
        trace!(keys = section.len(), "Decoded YAML document");
        Ok(section)
    }
}

fn untag(value: YamlValue) -> YamlValue {
    match value {
        YamlValue::Tagged(tagged) => untag(tagged.value),
        other => other,
    }
}

/// Only whitespace, comments or document markers
fn is_blank(input: &str) -> bool {
    input.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Serializer writing YAML with default options
pub fn serializer() -> ConfigSerializer<YamlFormat> {
    ConfigSerializer::new(YamlFormat::default())
}

/// Builder for a YAML serializer with default options
pub fn builder() -> ConfigSerializerBuilder<YamlFormat> {
    ConfigSerializer::builder(YamlFormat::default())
}
