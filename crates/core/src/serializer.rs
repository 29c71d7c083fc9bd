//! Serializer contract and the context serializers run in

use crate::error::{ErrorContainer, ErrorKind, Result};
use crate::options::ConfigOptions;
use crate::value::Value;
use std::sync::Arc;

/// Converts a `T` into a [`Value`] and back.
///
/// `deserialize` returns `Ok(None)` when no value could be produced; the
/// reason should be recorded in `errors`. An `Err` is only returned when an
/// error handler asked to abort.
pub trait Serializer<T>: Send + Sync {
    fn serialize(&self, value: &T, context: &SerializerContext) -> Result<Value>;

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<T>>;
}

/// Types with a built-in serializer
pub trait Serializable: Sized + Send + Sync + 'static {
    /// Whether a missing key is acceptable for a node of this type
    const OPTIONAL: bool = false;

    fn serializer(context: &SerializerContext) -> Arc<dyn Serializer<Self>>;
}

/// Options plus the key path of the value being processed
#[derive(Debug, Clone, Default)]
pub struct SerializerContext {
    options: ConfigOptions,
    path: Vec<String>,
}

impl SerializerContext {
    pub fn new(options: ConfigOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
        }
    }

    /// Context for a child value stored under `key`
    pub fn with_key(&self, key: &str) -> Self {
        let mut path = self.path.clone();
        path.push(key.to_string());
        Self {
            options: self.options.clone(),
            path,
        }
    }

    /// Dotted key path, empty at the document root
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Last key of the path
    pub fn key(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// Registered serializer for `T`, falling back to its built-in one
    pub fn serializer_for<T: Serializable>(&self) -> Arc<dyn Serializer<T>> {
        self.registered::<T>()
            .unwrap_or_else(|| T::serializer(self))
    }

    /// Serializer registered for `T`, if any
    pub fn registered<T: 'static>(&self) -> Option<Arc<dyn Serializer<T>>> {
        self.options.registry().get::<T>(self)
    }

    /// Record an error at this context's path
    pub fn error(&self, errors: &mut ErrorContainer, kind: ErrorKind, message: impl Into<String>) {
        errors.error(self, kind, message);
    }
}
