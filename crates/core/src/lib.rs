//! Core of the Cogwheel configuration library
//!
//! This crate defines the format-agnostic document tree ([`Section`] and
//! [`Value`]), the [`Format`] contract implemented by the JSON, YAML and
//! properties backends, and the typed mapping layer that turns
//! [`Configuration`] structs into trees and back.

pub mod configuration;
pub mod error;
pub mod format;
pub mod fs;
pub mod handler;
pub mod key_format;
pub mod node;
pub mod number;
pub mod options;
pub mod registry;
pub mod report;
pub mod section;
pub mod serializer;
pub mod serializers;
pub mod value;

// Re-export commonly used types
pub use configuration::{Configuration, ConfigurationSerializer};
pub use error::{CogwheelError, ErrorContainer, ErrorEntry, ErrorKind, Result};
pub use format::{ConfigSerializer, ConfigSerializerBuilder, Format};
pub use handler::{
    CollectingErrorHandler, ErrorHandler, LogErrorHandler, StrictErrorHandler,
    SuppressingErrorHandler,
};
pub use key_format::KeyFormatter;
pub use node::{ConfigNode, DefaultNodeFilter, NodeFilter, NodeMeta};
pub use number::Number;
pub use options::ConfigOptions;
pub use registry::SerializerRegistry;
pub use report::{ValidationIssue, ValidationReport};
pub use section::{Entry, Section};
pub use serializer::{Serializable, Serializer, SerializerContext};
pub use serializers::{ConfigEnum, MapKey};
pub use value::Value;
