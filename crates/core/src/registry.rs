//! Serializers registered by type

use crate::error::{CogwheelError, Result};
use crate::serializer::{Serializer, SerializerContext};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Factory<T> = Arc<dyn Fn(&SerializerContext) -> Arc<dyn Serializer<T>> + Send + Sync>;

#[derive(Clone)]
struct Registration {
    type_name: &'static str,
    factory: Arc<dyn Any + Send + Sync>,
}

/// Serializer factories keyed by the type they produce.
///
/// Registered serializers take precedence over a type's built-in one.
/// Clones share their contents until one of them is modified.
#[derive(Clone, Default)]
pub struct SerializerRegistry {
    factories: Arc<HashMap<TypeId, Registration>>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single serializer instance for `T`
    pub fn add_serializer<T, S>(&mut self, serializer: S) -> Result<()>
    where
        T: 'static,
        S: Serializer<T> + 'static,
    {
        let serializer: Arc<dyn Serializer<T>> = Arc::new(serializer);
        self.add_factory::<T, _>(move |_| serializer.clone())
    }

    /// Register a factory creating a serializer for `T` in a given context
    pub fn add_factory<T, F>(&mut self, factory: F) -> Result<()>
    where
        T: 'static,
        F: Fn(&SerializerContext) -> Arc<dyn Serializer<T>> + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();
        if self.factories.contains_key(&type_id) {
            return Err(CogwheelError::DuplicateSerializer {
                type_name: type_name.to_string(),
            });
        }

        let factory: Factory<T> = Arc::new(factory);
        Arc::make_mut(&mut self.factories).insert(
            type_id,
            Registration {
                type_name,
                factory: Arc::new(factory),
            },
        );
        Ok(())
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    /// Create the registered serializer for `T`, if any
    pub fn get<T: 'static>(&self, context: &SerializerContext) -> Option<Arc<dyn Serializer<T>>> {
        let registration = self.factories.get(&TypeId::of::<T>())?;
        let factory = registration.factory.downcast_ref::<Factory<T>>()?;
        Some(factory(context))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.values().map(|r| r.type_name).collect();
        names.sort_unstable();
        f.debug_struct("SerializerRegistry")
            .field("types", &names)
            .finish()
    }
}
