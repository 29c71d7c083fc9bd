//! Document formats and the serializer facade built on them

use crate::configuration::Configuration;
use crate::error::{CogwheelError, ErrorContainer, Result};
use crate::fs;
use crate::handler::ErrorHandler;
use crate::key_format::KeyFormatter;
use crate::node::NodeFilter;
use crate::options::ConfigOptions;
use crate::registry::SerializerRegistry;
use crate::section::Section;
use crate::serializer::{Serializer, SerializerContext};
use crate::serializers::short_type_name;
use crate::value::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Encodes sections to text and decodes them back
pub trait Format: Send + Sync {
    /// Human readable name used in errors and logs
    fn name(&self) -> &str;

    /// File extensions without the leading dot
    fn extensions(&self) -> &[&str];

    fn encode(&self, section: &Section) -> Result<String>;

    fn decode(&self, input: &str) -> Result<Section>;

    fn encode_to_vec(&self, section: &Section) -> Result<Vec<u8>> {
        self.encode(section).map(String::into_bytes)
    }

    fn decode_slice(&self, input: &[u8]) -> Result<Section> {
        let text = std::str::from_utf8(input).map_err(|e| {
            CogwheelError::parse(self.name(), format!("input is not valid UTF-8: {}", e))
        })?;
        self.decode(text)
    }
}

impl<F: Format + ?Sized> Format for Box<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extensions(&self) -> &[&str] {
        (**self).extensions()
    }

    fn encode(&self, section: &Section) -> Result<String> {
        (**self).encode(section)
    }

    fn decode(&self, input: &str) -> Result<Section> {
        (**self).decode(input)
    }
}

impl<F: Format + ?Sized> Format for &F {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extensions(&self) -> &[&str] {
        (**self).extensions()
    }

    fn encode(&self, section: &Section) -> Result<String> {
        (**self).encode(section)
    }

    fn decode(&self, input: &str) -> Result<Section> {
        (**self).decode(input)
    }
}

/// Saves and loads [`Configuration`]s through a [`Format`]
#[derive(Debug, Clone)]
pub struct ConfigSerializer<F> {
    format: F,
    options: ConfigOptions,
}

impl<F: Format> ConfigSerializer<F> {
    /// Serializer with default options
    pub fn new(format: F) -> Self {
        Self {
            format,
            options: ConfigOptions::default(),
        }
    }

    pub fn builder(format: F) -> ConfigSerializerBuilder<F> {
        ConfigSerializerBuilder {
            format,
            options: ConfigOptions::default(),
        }
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    fn context(&self) -> SerializerContext {
        SerializerContext::new(self.options.clone())
    }

    /// Convert a configuration into a section
    pub fn serialize<C: Configuration>(&self, config: &C) -> Result<Section> {
        let context = self.context();
        match context.serializer_for::<C>().serialize(config, &context)? {
            Value::Map(section) => Ok(section),
            other => Err(CogwheelError::Format(format!(
                "{} serialized to a {} instead of a map",
                short_type_name::<C>(),
                other.kind()
            ))),
        }
    }

    /// Build a configuration from a section
    pub fn deserialize<C: Configuration>(&self, section: &Section) -> Result<C> {
        let context = self.context();
        let mut errors = ErrorContainer::new();
        let loaded = context.serializer_for::<C>().deserialize(
            &Value::Map(section.clone()),
            &context,
            &mut errors,
        )?;
        errors.handle_errors(&context)?;
        loaded.ok_or_else(|| CogwheelError::Load {
            type_name: short_type_name::<C>(),
        })
    }

    pub fn to_string<C: Configuration>(&self, config: &C) -> Result<String> {
        self.format.encode(&self.serialize(config)?)
    }

    pub fn from_str<C: Configuration>(&self, input: &str) -> Result<C> {
        self.deserialize(&self.format.decode(input)?)
    }

    /// Write a configuration to `path`, creating parent directories
    pub fn save<C: Configuration>(&self, path: impl AsRef<Path>, config: &C) -> Result<()> {
        let section = self.serialize(config)?;
        self.save_section(path, &section)
    }

    pub fn load<C: Configuration>(&self, path: impl AsRef<Path>) -> Result<C> {
        let section = self.load_section(path)?;
        self.deserialize(&section)
    }

    /// Decode a file without mapping it to a configuration
    pub fn load_section(&self, path: impl AsRef<Path>) -> Result<Section> {
        let path = path.as_ref();
        debug!(path = %path.display(), format = self.format.name(), "Loading configuration");
        let bytes = fs::read_file(path)?;
        self.format.decode_slice(&bytes)
    }

    pub fn save_section(&self, path: impl AsRef<Path>, section: &Section) -> Result<()> {
        let path = path.as_ref();
        debug!(
            path = %path.display(),
            format = self.format.name(),
            keys = section.len(),
            "Saving configuration"
        );
        let bytes = self.format.encode_to_vec(section)?;
        fs::write_file(path, &bytes)
    }
}

/// Builder for [`ConfigSerializer`]
#[derive(Debug)]
pub struct ConfigSerializerBuilder<F> {
    format: F,
    options: ConfigOptions,
}

impl<F: Format> ConfigSerializerBuilder<F> {
    /// Replace the registry with `registry`
    pub fn registry(mut self, registry: SerializerRegistry) -> Self {
        self.options.set_registry(registry);
        self
    }

    /// Register a serializer; fails if `T` already has one
    pub fn add_serializer<T, S>(mut self, serializer: S) -> Result<Self>
    where
        T: 'static,
        S: Serializer<T> + 'static,
    {
        self.options.registry_mut().add_serializer::<T, S>(serializer)?;
        Ok(self)
    }

    pub fn key_formatter(mut self, formatter: impl KeyFormatter + 'static) -> Self {
        self.options.set_key_formatter(Arc::new(formatter));
        self
    }

    pub fn node_filter(mut self, filter: impl NodeFilter + 'static) -> Self {
        self.options.set_node_filter(Arc::new(filter));
        self
    }

    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.options.set_error_handler(Arc::new(handler));
        self
    }

    pub fn build(self) -> ConfigSerializer<F> {
        ConfigSerializer {
            format: self.format,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::handler::{CollectingErrorHandler, StrictErrorHandler};
    use crate::key_format::KebabCase;
    use crate::node::ConfigNode;
    use crate::node::NodeMeta;
    use tempfile::TempDir;

    /// Line based `key=value` format used to exercise the facade
    #[derive(Debug, Clone, Copy)]
    struct LineFormat;

    impl Format for LineFormat {
        fn name(&self) -> &str {
            "lines"
        }

        fn extensions(&self) -> &[&str] {
            &["lines"]
        }

        fn encode(&self, section: &Section) -> Result<String> {
            let mut out = String::new();
            for (key, value) in section.iter() {
                out.push_str(&format!("{}={}\n", key, value));
            }
            Ok(out)
        }

        fn decode(&self, input: &str) -> Result<Section> {
            let mut section = Section::new();
            for line in input.lines().filter(|l| !l.is_empty()) {
                let (key, value) = line
                    .split_once('=')
                    .ok_or_else(|| CogwheelError::parse("lines", format!("missing '=' in {}", line)))?;
                section.insert(key, value);
            }
            Ok(section)
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct App {
        name: String,
        worker_count: u16,
        debug: bool,
    }

    impl Configuration for App {
        fn nodes() -> Vec<ConfigNode<Self>> {
            vec![
                ConfigNode::new("name", |c: &Self| &c.name, |c: &mut Self, v| c.name = v),
                ConfigNode::new(
                    "worker_count",
                    |c: &Self| &c.worker_count,
                    |c: &mut Self, v| c.worker_count = v,
                ),
                ConfigNode::new("debug", |c: &Self| &c.debug, |c: &mut Self, v| c.debug = v),
            ]
        }
    }

    fn app() -> App {
        App {
            name: "cog".to_string(),
            worker_count: 4,
            debug: true,
        }
    }

    #[test]
    fn test_string_round_trip() {
        let serializer = ConfigSerializer::builder(LineFormat)
            .key_formatter(KebabCase)
            .build();
        let text = serializer.to_string(&app()).unwrap();
        assert_eq!(text, "name=cog\nworker-count=4\ndebug=true\n");
        let loaded: App = serializer.from_str(&text).unwrap();
        assert_eq!(loaded, app());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf/app.lines");
        let serializer = ConfigSerializer::new(LineFormat);

        serializer.save(&path, &app()).unwrap();
        let loaded: App = serializer.load(&path).unwrap();
        assert_eq!(loaded, app());

        let section = serializer.load_section(&path).unwrap();
        assert_eq!(section.get_str("worker_count"), Some("4"));
    }

    #[test]
    fn test_boxed_and_borrowed_formats() {
        let boxed: Box<dyn Format> = Box::new(LineFormat);
        let serializer = ConfigSerializer::new(boxed);
        assert_eq!(serializer.format().name(), "lines");
        assert!(serializer.to_string(&app()).is_ok());

        let format = LineFormat;
        let borrowed = ConfigSerializer::new(&format);
        assert_eq!(borrowed.format().extensions(), &["lines"]);
    }

    #[test]
    fn test_decode_slice_rejects_invalid_utf8() {
        let err = LineFormat.decode_slice(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, CogwheelError::Parse { .. }));
    }

    #[test]
    fn test_strict_load_fails() {
        let serializer = ConfigSerializer::builder(LineFormat)
            .error_handler(StrictErrorHandler)
            .build();
        let err = serializer.from_str::<App>("name=cog\n").unwrap_err();
        assert!(matches!(
            err,
            CogwheelError::Rejected(ref entry) if entry.kind == ErrorKind::KeyNotFound
        ));
    }

    #[test]
    fn test_collecting_load_continues() {
        let handler = CollectingErrorHandler::new();
        let serializer = ConfigSerializer::builder(LineFormat)
            .error_handler(handler.clone())
            .build();
        let loaded: App = serializer
            .from_str("name=cog\nworker_count=lots\ndebug=TRUE\nextra=1\n")
            .unwrap();
        assert_eq!(loaded.worker_count, 0);
        assert!(loaded.debug);

        let report = handler.report();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_builder_registry_and_filter() {
        #[derive(Debug)]
        struct SkipDebug;

        impl NodeFilter for SkipDebug {
            fn include(&self, node: &NodeMeta) -> bool {
                node.name != "debug"
            }
        }

        let serializer = ConfigSerializer::builder(LineFormat)
            .node_filter(SkipDebug)
            .build();
        assert_eq!(
            serializer.to_string(&app()).unwrap(),
            "name=cog\nworker_count=4\n"
        );

        let mut registry = SerializerRegistry::new();
        registry
            .add_serializer::<bool, _>(crate::serializers::BoolSerializer)
            .unwrap();
        let err = ConfigSerializer::builder(LineFormat)
            .registry(registry)
            .add_serializer::<bool, _>(crate::serializers::BoolSerializer)
            .unwrap_err();
        assert!(matches!(err, CogwheelError::DuplicateSerializer { .. }));
    }
}
