//! Settings loader

use super::schema::Settings;
use super::SettingsError;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use std::path::Path;
use tracing::debug;

const ENV_PREFIX: &str = "COGWHEEL_";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["json", "pretty"];

/// Loads settings from defaults, an optional YAML file and the environment
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings; a missing file leaves the defaults in place
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        Self::load_with_prefix(path.as_ref(), ENV_PREFIX)
    }

    fn load_with_prefix(path: &Path, env_prefix: &str) -> Result<Settings> {
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
        }

        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Yaml::file(path))
            // COGWHEEL_YAML__INDENT=4 sets yaml.indent
            .merge(Env::prefixed(env_prefix).split("__"))
            .extract()
            .context("Failed to parse settings")?;

        Self::validate(&settings)?;
        Ok(settings)
    }

    /// Load settings from a YAML string
    pub fn load_from_str(yaml_content: &str) -> Result<Settings> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Yaml::string(yaml_content))
            .extract()
            .context("Failed to parse settings from string")?;

        Self::validate(&settings)?;
        Ok(settings)
    }

    pub fn validate(settings: &Settings) -> std::result::Result<(), SettingsError> {
        if !LOG_LEVELS.contains(&settings.logging.level.as_str()) {
            return Err(SettingsError::Invalid {
                field: "logging.level".to_string(),
                message: format!(
                    "Invalid log level: {}. Valid levels: {:?}",
                    settings.logging.level, LOG_LEVELS
                ),
            });
        }

        if !LOG_FORMATS.contains(&settings.logging.format.as_str()) {
            return Err(SettingsError::Invalid {
                field: "logging.format".to_string(),
                message: format!(
                    "Invalid log format: {}. Valid formats: {:?}",
                    settings.logging.format, LOG_FORMATS
                ),
            });
        }

        if settings.json.pretty && settings.json.indent == 0 {
            return Err(SettingsError::Invalid {
                field: "json.indent".to_string(),
                message: "Indent must be greater than 0 for pretty output".to_string(),
            });
        }

        if !(1..=16).contains(&settings.yaml.indent) {
            return Err(SettingsError::Invalid {
                field: "yaml.indent".to_string(),
                message: format!("Indent must be between 1 and 16, got {}", settings.yaml.indent),
            });
        }

        if let Some(line) = settings.properties.header.iter().find(|l| l.contains('\n')) {
            return Err(SettingsError::Invalid {
                field: "properties.header".to_string(),
                message: format!("Header lines cannot contain line breaks: {:?}", line),
            });
        }

        Ok(())
    }

    /// Write the default settings as YAML
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml_content = serde_yaml::to_string(&Settings::default())
            .context("Failed to serialize default settings")?;

        cogwheel_core::fs::write_file(path.as_ref(), yaml_content.as_bytes())
            .context("Failed to write example settings file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let settings = SettingsLoader::load_with_prefix(
            &dir.path().join("missing.yaml"),
            "COGWHEEL_TEST_DEFAULTS_",
        )
        .unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.logging.level, "warn");
        assert!(settings.json.pretty);
        assert_eq!(settings.yaml.indent, 2);
    }

    #[test]
    fn test_load_from_string() {
        let settings = SettingsLoader::load_from_str(
            r#"
logging:
  level: debug
  format: json
json:
  pretty: false
properties:
  header: ["Generated by cogwheel"]
  colon_separator: true
"#,
        )
        .unwrap();
        assert_eq!(settings.logging.format, "json");
        assert!(!settings.json_format().pretty);
        assert_eq!(settings.json.indent, 2);
        assert!(settings.yaml_format().comments);

        let properties = settings.properties_format();
        assert_eq!(properties.header, vec!["Generated by cogwheel".to_string()]);
        assert!(properties.colon_separator);
        assert!(!properties.spaces_around_separator);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cogwheel.yaml");
        std::fs::write(&path, "yaml:\n  indent: 3\n  comments: false\n").unwrap();

        std::env::set_var("COGWHEEL_TEST_ENV_YAML__INDENT", "4");
        std::env::set_var("COGWHEEL_TEST_ENV_LOGGING__LEVEL", "info");
        let settings = SettingsLoader::load_with_prefix(&path, "COGWHEEL_TEST_ENV_");
        std::env::remove_var("COGWHEEL_TEST_ENV_YAML__INDENT");
        std::env::remove_var("COGWHEEL_TEST_ENV_LOGGING__LEVEL");

        let settings = settings.unwrap();
        assert_eq!(settings.yaml.indent, 4);
        assert!(!settings.yaml.comments);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_validation_errors() {
        let err = SettingsLoader::load_from_str("logging:\n  level: loud\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<SettingsError>().map(|e| match e {
                SettingsError::Invalid { field, .. } => field.as_str(),
            }),
            Some("logging.level")
        );

        assert!(SettingsLoader::load_from_str("logging:\n  format: xml\n").is_err());
        assert!(SettingsLoader::load_from_str("yaml:\n  indent: 0\n").is_err());
        assert!(SettingsLoader::load_from_str("json:\n  indent: 0\n").is_err());
        assert!(SettingsLoader::load_from_str("json:\n  pretty: false\n  indent: 0\n").is_ok());
        assert!(SettingsLoader::load_from_str("yaml:\n  indent: many\n").is_err());
    }

    #[test]
    fn test_create_example() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf/cogwheel.yaml");
        SettingsLoader::create_example(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("logging:"));
        assert!(content.contains("properties:"));

        let settings = SettingsLoader::load_with_prefix(&path, "COGWHEEL_TEST_EXAMPLE_").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
