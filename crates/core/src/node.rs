//! Node descriptors: how a configuration field maps to a document key

use crate::configuration::Configuration;
use crate::error::{ErrorContainer, Result};
use crate::key_format::KeyFormatter;
use crate::serializer::{Serializable, Serializer, SerializerContext};
use crate::serializers::{deserialize_value, short_type_name};
use crate::value::Value;
use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::warn;

/// Everything about a node except how its value is accessed
#[derive(Clone)]
pub struct NodeMeta {
    pub name: String,
    /// Key used instead of the name; still subject to key formatting
    pub key: Option<String>,
    pub comments: Vec<String>,
    pub inline_comment: Option<String>,
    pub optional: bool,
    pub hidden: bool,
    pub ignored: bool,
    pub key_formatter: Option<Arc<dyn KeyFormatter>>,
    pub type_name: String,
}

impl NodeMeta {
    /// Key of this node in a document.
    ///
    /// The node's own formatter wins over the configuration's, which wins
    /// over the one from the options.
    pub fn formatted_key(
        &self,
        configuration_formatter: Option<&dyn KeyFormatter>,
        options_formatter: &dyn KeyFormatter,
    ) -> String {
        let key = self.key.as_deref().unwrap_or(&self.name);
        match (&self.key_formatter, configuration_formatter) {
            (Some(formatter), _) => formatter.format(key),
            (None, Some(formatter)) => formatter.format(key),
            (None, None) => options_formatter.format(key),
        }
    }
}

impl Debug for NodeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeMeta")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .field("optional", &self.optional)
            .field("hidden", &self.hidden)
            .field("ignored", &self.ignored)
            .finish()
    }
}

/// Decides which nodes take part in serialization
pub trait NodeFilter: Send + Sync + Debug {
    fn include(&self, node: &NodeMeta) -> bool;
}

/// Includes every node that is not ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNodeFilter;

impl NodeFilter for DefaultNodeFilter {
    fn include(&self, node: &NodeMeta) -> bool {
        !node.ignored
    }
}

/// Result of reading a node's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The value was stored in the configuration
    Assigned,
    /// The serializer produced nothing
    NoValue,
    /// No serializer is available for the node's type
    NoSerializer,
}

trait NodeAccess<C>: Send + Sync {
    /// `None` when no serializer is available
    fn write(&self, config: &C, context: &SerializerContext) -> Result<Option<Value>>;

    fn read(
        &self,
        config: &mut C,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<ReadOutcome>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

type Getter<C, F> = Box<dyn Fn(&C) -> &F + Send + Sync>;
type Setter<C, F> = Box<dyn Fn(&mut C, F) + Send + Sync>;
type Lookup<F> = fn(&SerializerContext) -> Option<Arc<dyn Serializer<F>>>;

struct FieldAccess<C, F> {
    get: Getter<C, F>,
    set: Setter<C, F>,
    lookup: Lookup<F>,
    serializer: Option<Arc<dyn Serializer<F>>>,
    writer: Option<Arc<dyn Serializer<F>>>,
    reader: Option<Arc<dyn Serializer<F>>>,
}

impl<C, F> FieldAccess<C, F> {
    fn resolve(
        &self,
        preferred: &Option<Arc<dyn Serializer<F>>>,
        context: &SerializerContext,
    ) -> Option<Arc<dyn Serializer<F>>> {
        preferred
            .clone()
            .or_else(|| self.serializer.clone())
            .or_else(|| (self.lookup)(context))
    }
}

impl<C: 'static, F: 'static> NodeAccess<C> for FieldAccess<C, F> {
    fn write(&self, config: &C, context: &SerializerContext) -> Result<Option<Value>> {
        match self.resolve(&self.writer, context) {
            Some(serializer) => serializer.serialize((self.get)(config), context).map(Some),
            None => Ok(None),
        }
    }

    fn read(
        &self,
        config: &mut C,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<ReadOutcome> {
        let Some(serializer) = self.resolve(&self.reader, context) else {
            return Ok(ReadOutcome::NoSerializer);
        };
        match deserialize_value(serializer.as_ref(), value, context, errors)? {
            Some(field) => {
                (self.set)(config, field);
                Ok(ReadOutcome::Assigned)
            }
            None => Ok(ReadOutcome::NoValue),
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn default_lookup<F: Serializable>(context: &SerializerContext) -> Option<Arc<dyn Serializer<F>>> {
    Some(context.serializer_for::<F>())
}

fn registry_lookup<F: 'static>(context: &SerializerContext) -> Option<Arc<dyn Serializer<F>>> {
    context.registered::<F>()
}

/// One field of a configuration type
pub struct ConfigNode<C> {
    meta: NodeMeta,
    access: Box<dyn NodeAccess<C>>,
}

impl<C: Configuration> ConfigNode<C> {
    /// Node for a field with a built-in or registered serializer
    pub fn new<F, G, S>(name: &str, get: G, set: S) -> Self
    where
        F: Serializable,
        G: Fn(&C) -> &F + Send + Sync + 'static,
        S: Fn(&mut C, F) + Send + Sync + 'static,
    {
        let mut node = Self::with_lookup(name, get, set, default_lookup::<F>);
        node.meta.optional = F::OPTIONAL;
        node
    }

    /// Node for a field whose type is only known through the registry
    /// or a serializer given with [`ConfigNode::serialize_with`]
    pub fn custom<F, G, S>(name: &str, get: G, set: S) -> Self
    where
        F: Send + Sync + 'static,
        G: Fn(&C) -> &F + Send + Sync + 'static,
        S: Fn(&mut C, F) + Send + Sync + 'static,
    {
        Self::with_lookup(name, get, set, registry_lookup::<F>)
    }

    fn with_lookup<F, G, S>(name: &str, get: G, set: S, lookup: Lookup<F>) -> Self
    where
        F: 'static,
        G: Fn(&C) -> &F + Send + Sync + 'static,
        S: Fn(&mut C, F) + Send + Sync + 'static,
    {
        Self {
            meta: NodeMeta {
                name: name.to_string(),
                key: None,
                comments: Vec::new(),
                inline_comment: None,
                optional: false,
                hidden: false,
                ignored: false,
                key_formatter: None,
                type_name: short_type_name::<F>(),
            },
            access: Box::new(FieldAccess {
                get: Box::new(get),
                set: Box::new(set),
                lookup,
                serializer: None,
                writer: None,
                reader: None,
            }),
        }
    }

    /// Store the node under `key` instead of its name
    pub fn key(mut self, key: &str) -> Self {
        self.meta.key = Some(key.to_string());
        self
    }

    /// Add a comment line above the entry; an empty line writes a blank comment
    pub fn comment(mut self, line: &str) -> Self {
        self.meta.comments.push(line.to_string());
        self
    }

    pub fn inline_comment(mut self, comment: &str) -> Self {
        self.meta.inline_comment = Some(comment.to_string());
        self
    }

    /// A missing key keeps the default value instead of being reported
    pub fn optional(mut self) -> Self {
        self.meta.optional = true;
        self
    }

    /// Optional, and not written at all while its value is null
    pub fn hidden(mut self) -> Self {
        self.meta.hidden = true;
        self.meta.optional = true;
        self
    }

    /// Excluded by the default node filter
    pub fn ignore(mut self) -> Self {
        self.meta.ignored = true;
        self
    }

    pub fn format_key_with(mut self, formatter: impl KeyFormatter + 'static) -> Self {
        self.meta.key_formatter = Some(Arc::new(formatter));
        self
    }

    /// Use `serializer` for both reading and writing this node
    pub fn serialize_with<F, S>(self, serializer: S) -> Self
    where
        F: 'static,
        S: Serializer<F> + 'static,
    {
        self.set_serializer(serializer, |field, s| field.serializer = Some(s))
    }

    /// Use `serializer` when writing this node
    pub fn write_with<F, S>(self, serializer: S) -> Self
    where
        F: 'static,
        S: Serializer<F> + 'static,
    {
        self.set_serializer(serializer, |field, s| field.writer = Some(s))
    }

    /// Use `serializer` when reading this node
    pub fn read_with<F, S>(self, serializer: S) -> Self
    where
        F: 'static,
        S: Serializer<F> + 'static,
    {
        self.set_serializer(serializer, |field, s| field.reader = Some(s))
    }

    fn set_serializer<F, S>(
        mut self,
        serializer: S,
        assign: impl FnOnce(&mut FieldAccess<C, F>, Arc<dyn Serializer<F>>),
    ) -> Self
    where
        F: 'static,
        S: Serializer<F> + 'static,
    {
        match self.access.as_any_mut().downcast_mut::<FieldAccess<C, F>>() {
            Some(field) => assign(field, Arc::new(serializer)),
            None => warn!(
                node = %self.meta.name,
                expected = %self.meta.type_name,
                given = %short_type_name::<F>(),
                "Serializer type does not match the node type, ignoring it"
            ),
        }
        self
    }

    pub fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Serialize the node's value; `None` when no serializer is available
    pub fn write(&self, config: &C, context: &SerializerContext) -> Result<Option<Value>> {
        self.access.write(config, context)
    }

    /// Deserialize `value` into the node's field
    pub fn read(
        &self,
        config: &mut C,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<ReadOutcome> {
        self.access.read(config, value, context, errors)
    }
}

impl<C> Debug for ConfigNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNode").field("meta", &self.meta).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::key_format::{KebabCase, UpperCase};
    use crate::options::ConfigOptions;

    #[derive(Debug, Default, PartialEq)]
    struct Server {
        host: String,
        max_players: u32,
        motd: Option<String>,
    }

    impl Configuration for Server {
        fn nodes() -> Vec<ConfigNode<Self>> {
            vec![
                ConfigNode::new("host", |c: &Self| &c.host, |c: &mut Self, v| c.host = v),
                ConfigNode::new(
                    "max_players",
                    |c: &Self| &c.max_players,
                    |c: &mut Self, v| c.max_players = v,
                ),
                ConfigNode::new("motd", |c: &Self| &c.motd, |c: &mut Self, v| c.motd = v),
            ]
        }
    }

    struct Doubling;

    impl Serializer<u32> for Doubling {
        fn serialize(&self, value: &u32, _context: &SerializerContext) -> Result<Value> {
            Ok(Value::from(value * 2))
        }

        fn deserialize(
            &self,
            value: &Value,
            _context: &SerializerContext,
            _errors: &mut ErrorContainer,
        ) -> Result<Option<u32>> {
            Ok(value.as_number().map(|n| (n.as_i128() / 2) as u32))
        }
    }

    fn context() -> SerializerContext {
        SerializerContext::new(ConfigOptions::default())
    }

    fn players_node() -> ConfigNode<Server> {
        ConfigNode::new(
            "max_players",
            |c: &Server| &c.max_players,
            |c: &mut Server, v| c.max_players = v,
        )
    }

    fn host_node() -> ConfigNode<Server> {
        ConfigNode::new("host", |c: &Server| &c.host, |c: &mut Server, v| c.host = v)
    }

    #[test]
    fn test_optional_follows_field_type() {
        let nodes = Server::nodes();
        assert!(!nodes[0].meta().optional);
        assert!(nodes[2].meta().optional);
        assert_eq!(nodes[1].meta().type_name, "u32");
        assert_eq!(nodes[2].meta().type_name, "Option<String>");
    }

    #[test]
    fn test_formatted_key_precedence() {
        let node = players_node();
        assert_eq!(node.meta().formatted_key(None, &KebabCase), "max-players");
        assert_eq!(
            node.meta().formatted_key(Some(&UpperCase), &KebabCase),
            "MAX PLAYERS"
        );

        let node = node.key("slots").format_key_with(UpperCase);
        assert_eq!(node.meta().formatted_key(None, &KebabCase), "SLOTS");
    }

    #[test]
    fn test_hidden_implies_optional_and_filter() {
        let node = host_node().hidden();
        assert!(node.meta().optional);
        assert!(DefaultNodeFilter.include(node.meta()));
        assert!(!DefaultNodeFilter.include(node.ignore().meta()));
    }

    #[test]
    fn test_read_and_write() {
        let node = players_node();
        let mut server = Server::default();
        let mut errors = ErrorContainer::new();

        let outcome = node
            .read(&mut server, &Value::from(20), &context(), &mut errors)
            .unwrap();
        assert_eq!(outcome, ReadOutcome::Assigned);
        assert_eq!(server.max_players, 20);
        assert_eq!(node.write(&server, &context()).unwrap(), Some(Value::from(20u32)));

        let outcome = node
            .read(&mut server, &Value::from(false), &context(), &mut errors)
            .unwrap();
        assert_eq!(outcome, ReadOutcome::NoValue);
        assert_eq!(errors.iter().next().map(|e| e.kind), Some(ErrorKind::MismatchedTypes));
    }

    #[test]
    fn test_custom_serializers() {
        let node = players_node().serialize_with(Doubling);
        let server = Server {
            max_players: 5,
            ..Default::default()
        };
        assert_eq!(node.write(&server, &context()).unwrap(), Some(Value::from(10u32)));

        let node = players_node().write_with(Doubling);
        let mut copy = Server::default();
        let mut errors = ErrorContainer::new();
        node.read(&mut copy, &Value::from(10), &context(), &mut errors).unwrap();
        assert_eq!(copy.max_players, 10);

        // Mismatched serializer types are ignored
        let node = host_node().serialize_with(Doubling);
        let server = Server {
            host: "localhost".into(),
            ..Default::default()
        };
        assert_eq!(node.write(&server, &context()).unwrap(), Some(Value::from("localhost")));
    }

    #[test]
    fn test_registry_only_node() {
        #[derive(Debug, Default, PartialEq, Clone, Copy)]
        struct Ticks(u64);

        #[derive(Debug, Default)]
        struct Holder {
            ticks: Ticks,
        }

        impl Configuration for Holder {
            fn nodes() -> Vec<ConfigNode<Self>> {
                vec![ConfigNode::custom("ticks", |c: &Self| &c.ticks, |c: &mut Self, v| c.ticks = v)]
            }
        }

        let nodes = Holder::nodes();
        let node = &nodes[0];
        let mut holder = Holder::default();
        let mut errors = ErrorContainer::new();
        assert_eq!(node.write(&holder, &context()).unwrap(), None);
        assert_eq!(
            node.read(&mut holder, &Value::from(1), &context(), &mut errors)
                .unwrap(),
            ReadOutcome::NoSerializer
        );
    }
}
