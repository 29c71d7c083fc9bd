//! Options shared by every serializer of a load or save

use crate::handler::{ErrorHandler, LogErrorHandler};
use crate::key_format::{IdentityKeyFormatter, KeyFormatter};
use crate::node::{DefaultNodeFilter, NodeFilter};
use crate::registry::SerializerRegistry;
use std::sync::Arc;

/// Registry, key formatter, node filter and error handler in effect
#[derive(Debug, Clone)]
pub struct ConfigOptions {
    registry: SerializerRegistry,
    key_formatter: Arc<dyn KeyFormatter>,
    node_filter: Arc<dyn NodeFilter>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            registry: SerializerRegistry::new(),
            key_formatter: Arc::new(IdentityKeyFormatter),
            node_filter: Arc::new(DefaultNodeFilter),
            error_handler: Arc::new(LogErrorHandler),
        }
    }
}

impl ConfigOptions {
    pub fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SerializerRegistry {
        &mut self.registry
    }

    pub fn key_formatter(&self) -> &dyn KeyFormatter {
        self.key_formatter.as_ref()
    }

    pub fn node_filter(&self) -> &dyn NodeFilter {
        self.node_filter.as_ref()
    }

    pub fn error_handler(&self) -> &dyn ErrorHandler {
        self.error_handler.as_ref()
    }

    pub fn set_registry(&mut self, registry: SerializerRegistry) {
        self.registry = registry;
    }

    pub fn set_key_formatter(&mut self, formatter: Arc<dyn KeyFormatter>) {
        self.key_formatter = formatter;
    }

    pub fn set_node_filter(&mut self, filter: Arc<dyn NodeFilter>) {
        self.node_filter = filter;
    }

    pub fn set_error_handler(&mut self, handler: Arc<dyn ErrorHandler>) {
        self.error_handler = handler;
    }
}
