//! Settings schema for the `cogwheel` tool

use cogwheel_json::JsonFormat;
use cogwheel_properties::PropertiesFormat;
use cogwheel_yaml::YamlFormat;
use serde::{Deserialize, Serialize};

/// Tool settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
    /// JSON output options
    #[serde(default)]
    pub json: JsonSettings,
    /// YAML output options
    #[serde(default)]
    pub yaml: YamlSettings,
    /// Properties output options
    #[serde(default)]
    pub properties: PropertiesSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSettings {
    #[serde(default = "default_true")]
    pub pretty: bool,
    #[serde(default = "default_indent")]
    pub indent: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YamlSettings {
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// Write entry comments and recover them when reading
    #[serde(default = "default_true")]
    pub comments: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertiesSettings {
    /// Comment lines written at the top of each file
    #[serde(default)]
    pub header: Vec<String>,
    #[serde(default)]
    pub colon_separator: bool,
    #[serde(default)]
    pub exclamation_mark_comments: bool,
    #[serde(default)]
    pub spaces_around_separator: bool,
    #[serde(default)]
    pub empty_line_between_entries: bool,
}

impl Settings {
    pub fn json_format(&self) -> JsonFormat {
        JsonFormat {
            pretty: self.json.pretty,
            indent: self.json.indent,
        }
    }

    pub fn yaml_format(&self) -> YamlFormat {
        YamlFormat {
            indent: self.yaml.indent,
            comments: self.yaml.comments,
        }
    }

    pub fn properties_format(&self) -> PropertiesFormat {
        let p = &self.properties;
        PropertiesFormat {
            header: p.header.clone(),
            colon_separator: p.colon_separator,
            exclamation_mark_comments: p.exclamation_mark_comments,
            spaces_around_separator: p.spaces_around_separator,
            empty_line_between_entries: p.empty_line_between_entries,
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_indent() -> usize {
    2
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            pretty: default_true(),
            indent: default_indent(),
        }
    }
}

impl Default for YamlSettings {
    fn default() -> Self {
        Self {
            indent: default_indent(),
            comments: default_true(),
        }
    }
}
