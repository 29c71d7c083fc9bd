//! Typed configurations and the serializer that maps them to sections

use crate::error::{ErrorContainer, ErrorKind, Result};
use crate::key_format::KeyFormatter;
use crate::node::{ConfigNode, ReadOutcome};
use crate::section::{Entry, Section};
use crate::serializer::{Serializable, Serializer, SerializerContext};
use crate::serializers::{mismatch_message, short_type_name};
use crate::value::Value;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

/// A struct stored as a section of key/value pairs.
///
/// Loading starts from `Default::default()` and overwrites every node found
/// in the document.
///
/// ```
/// use cogwheel_core::{ConfigNode, Configuration};
///
/// #[derive(Debug, Default)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// impl Configuration for Server {
///     fn nodes() -> Vec<ConfigNode<Self>> {
///         vec![
///             ConfigNode::new("host", |c: &Self| &c.host, |c: &mut Self, v| c.host = v),
///             ConfigNode::new("port", |c: &Self| &c.port, |c: &mut Self, v| c.port = v)
///                 .comment("Port to listen on"),
///         ]
///     }
/// }
/// ```
pub trait Configuration: Default + Send + Sync + 'static {
    fn nodes() -> Vec<ConfigNode<Self>>;

    /// Formatter applied to every node of this configuration that does not
    /// set its own
    fn key_formatter() -> Option<Arc<dyn KeyFormatter>> {
        None
    }
}

impl<C: Configuration> Serializable for C {
    fn serializer(_context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(ConfigurationSerializer::<C>::new())
    }
}

/// Maps a [`Configuration`] to a [`Value::Map`] and back
pub struct ConfigurationSerializer<C> {
    _config: PhantomData<fn() -> C>,
}

impl<C> ConfigurationSerializer<C> {
    pub fn new() -> Self {
        Self {
            _config: PhantomData,
        }
    }
}

impl<C> Default for ConfigurationSerializer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Configuration> ConfigurationSerializer<C> {
    fn included_nodes(context: &SerializerContext) -> Vec<ConfigNode<C>> {
        let filter = context.options().node_filter();
        C::nodes()
            .into_iter()
            .filter(|node| filter.include(node.meta()))
            .collect()
    }

    fn key_of(node: &ConfigNode<C>, formatter: &Option<Arc<dyn KeyFormatter>>, context: &SerializerContext) -> String {
        node.meta()
            .formatted_key(formatter.as_deref(), context.options().key_formatter())
    }

    /// Write every included node into a new section
    pub fn serialize_section(&self, config: &C, context: &SerializerContext) -> Result<Section> {
        let formatter = C::key_formatter();
        let mut section = Section::new();

        for node in Self::included_nodes(context) {
            let key = Self::key_of(&node, &formatter, context);
            let node_context = context.with_key(&key);

            let value = match node.write(config, &node_context)? {
                Some(value) => value,
                None => {
                    let mut errors = ErrorContainer::new();
                    node_context.error(
                        &mut errors,
                        ErrorKind::SerializerNotFound,
                        format!(
                            "Couldn't serialize type '{}'. Did you register a serializer for it?",
                            node.meta().type_name
                        ),
                    );
                    errors.handle_errors(&node_context)?;
                    continue;
                }
            };
            if value.is_null() && node.meta().hidden {
                trace!(key = %node_context.path(), "Skipping hidden null node");
                continue;
            }

            let mut entry = Entry::new(key, value);
            entry.comments = node.meta().comments.clone();
            entry.inline_comment = node.meta().inline_comment.clone();
            section.push_entry(entry);
        }

        Ok(section)
    }

    /// Build a configuration from `section`, reporting problems through the
    /// context's error handler
    pub fn deserialize_section(&self, section: &Section, context: &SerializerContext) -> Result<C> {
        let formatter = C::key_formatter();
        let mut config = C::default();
        let mut handled = HashSet::new();

        for node in Self::included_nodes(context) {
            let key = Self::key_of(&node, &formatter, context);
            let node_context = context.with_key(&key);
            let mut errors = ErrorContainer::new();

            match section.get(&key) {
                None | Some(Value::Null) => {
                    if !node.meta().optional {
                        node_context.error(
                            &mut errors,
                            ErrorKind::KeyNotFound,
                            format!("Required key '{}' is missing", key),
                        );
                    }
                }
                Some(value) => match node.read(&mut config, value, &node_context, &mut errors)? {
                    ReadOutcome::Assigned | ReadOutcome::NoValue => {}
                    ReadOutcome::NoSerializer => node_context.error(
                        &mut errors,
                        ErrorKind::SerializerNotFound,
                        format!(
                            "Couldn't deserialize type '{}'. Did you register a serializer for it?",
                            node.meta().type_name
                        ),
                    ),
                },
            }

            errors.handle_errors(&node_context)?;
            handled.insert(key);
        }

        let mut errors = ErrorContainer::new();
        for key in section.keys().filter(|k| !handled.contains(*k)) {
            context.error(
                &mut errors,
                ErrorKind::UnexpectedKey,
                format!("Unexpected key '{}' was found", key),
            );
        }
        errors.handle_errors(context)?;

        Ok(config)
    }
}

impl<C: Configuration> Serializer<C> for ConfigurationSerializer<C> {
    fn serialize(&self, value: &C, context: &SerializerContext) -> Result<Value> {
        self.serialize_section(value, context).map(Value::Map)
    }

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<C>> {
        match value.as_section() {
            Some(section) => self.deserialize_section(section, context).map(Some),
            None => {
                context.error(errors, ErrorKind::MismatchedTypes, mismatch_message::<C>(value));
                Ok(None)
            }
        }
    }
}

impl<C> std::fmt::Debug for ConfigurationSerializer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConfigurationSerializer<{}>", short_type_name::<C>())
    }
}
