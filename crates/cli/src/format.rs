//! Document format selection

use crate::settings::Settings;
use anyhow::{anyhow, Result};
use clap::ValueEnum;
use cogwheel_core::Format;
use std::fmt;
use std::path::Path;

/// Document formats the tool can read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatKind {
    Json,
    Yaml,
    Properties,
}

impl FormatKind {
    const ALL: [FormatKind; 3] = [FormatKind::Json, FormatKind::Yaml, FormatKind::Properties];

    /// Build the format configured by `settings`
    pub fn build(self, settings: &Settings) -> Box<dyn Format> {
        match self {
            FormatKind::Json => Box::new(settings.json_format()),
            FormatKind::Yaml => Box::new(settings.yaml_format()),
            FormatKind::Properties => Box::new(settings.properties_format()),
        }
    }

    /// Guess the format from a file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        let defaults = Settings::default();
        Self::ALL
            .into_iter()
            .find(|kind| kind.build(&defaults).extensions().contains(&extension.as_str()))
    }

    /// Use `explicit` if given, otherwise infer from `path`
    pub fn resolve(explicit: Option<Self>, path: Option<&Path>) -> Result<Self> {
        if let Some(kind) = explicit {
            return Ok(kind);
        }
        match path {
            Some(path) => Self::from_extension(path).ok_or_else(|| {
                anyhow!(
                    "Cannot infer the format of {}; pass it explicitly",
                    path.display()
                )
            }),
            None => Err(anyhow!("No file to infer the format from; pass it explicitly")),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::Json => write!(f, "json"),
            FormatKind::Yaml => write!(f, "yaml"),
            FormatKind::Properties => write!(f, "properties"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_extension() {
        assert_eq!(FormatKind::from_extension(Path::new("a.json")), Some(FormatKind::Json));
        assert_eq!(FormatKind::from_extension(Path::new("a.yml")), Some(FormatKind::Yaml));
        assert_eq!(FormatKind::from_extension(Path::new("dir/a.YAML")), Some(FormatKind::Yaml));
        assert_eq!(
            FormatKind::from_extension(Path::new("server.properties")),
            Some(FormatKind::Properties)
        );
        assert_eq!(FormatKind::from_extension(Path::new("a.toml")), None);
        assert_eq!(FormatKind::from_extension(Path::new("README")), None);
    }

    #[test]
    fn test_resolve() {
        let path = PathBuf::from("in.txt");
        assert_eq!(
            FormatKind::resolve(Some(FormatKind::Json), Some(&path)).unwrap(),
            FormatKind::Json
        );
        assert!(FormatKind::resolve(None, Some(&path)).is_err());
        assert!(FormatKind::resolve(None, None).is_err());
    }

    #[test]
    fn test_build_uses_settings() {
        let mut settings = Settings::default();
        settings.json.pretty = false;
        let format = FormatKind::Json.build(&settings);
        let mut section = cogwheel_core::Section::new();
        section.insert("a", 1);
        assert_eq!(format.encode(&section).unwrap(), "{\"a\":1}");
        assert_eq!(FormatKind::Properties.to_string(), "properties");
    }
}
