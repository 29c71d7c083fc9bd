//! Java `.properties` backend for Cogwheel
//!
//! Properties files are flat: every value is a scalar and is read back as a
//! string, relying on the core serializers to parse numbers and booleans.
//! Arrays and maps cannot be written.

mod reader;
mod writer;

use cogwheel_core::{ConfigSerializer, ConfigSerializerBuilder, Format, Result, Section};
use tracing::trace;

pub(crate) const FORMAT: &str = "Properties";

/// Properties layout options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesFormat {
    /// Comment lines written at the top of the file, followed by a blank line
    pub header: Vec<String>,
    /// Separate keys and values with `:` instead of `=`
    pub colon_separator: bool,
    /// Start comments with `!` instead of `#`
    pub exclamation_mark_comments: bool,
    pub spaces_around_separator: bool,
    pub empty_line_between_entries: bool,
}

impl PropertiesFormat {
    pub fn with_header<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = lines.into_iter().map(Into::into).collect();
        self
    }
}

impl Format for PropertiesFormat {
    fn name(&self) -> &str {
        FORMAT
    }

    fn extensions(&self) -> &[&str] {
        &["properties"]
    }

    fn encode(&self, section: &Section) -> Result<String> {
        writer::write(self, section)
    }

    fn decode(&self, input: &str) -> Result<Section> {
        let section = reader::parse(input)?;
        trace!(keys = section.len(), "Decoded properties document");
        Ok(section)
    }
}

/// Escape a key the way it is written to a file
pub fn escape_key(key: &str) -> String {
    writer::escape(key, true)
}

/// Escape a value the way it is written to a file
pub fn escape_value(value: &str) -> String {
    writer::escape(value, false)
}

/// Serializer writing properties with default options
pub fn serializer() -> ConfigSerializer<PropertiesFormat> {
    ConfigSerializer::new(PropertiesFormat::default())
}

/// Builder for a properties serializer with default options
pub fn builder() -> ConfigSerializerBuilder<PropertiesFormat> {
    ConfigSerializer::builder(PropertiesFormat::default())
}
