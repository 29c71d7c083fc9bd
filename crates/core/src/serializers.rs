//! Built-in serializers
//!
//! Scalars, strings, common value types, collections, maps and enums. Any
//! [`crate::Configuration`] is serializable as well, see
//! [`crate::ConfigurationSerializer`].

use crate::error::{ErrorContainer, ErrorKind, Result};
use crate::key_format::{KeyFormatter, SnakeCase};
use crate::number::{self, Number};
use crate::section::Section;
use crate::serializer::{Serializable, Serializer, SerializerContext};
use crate::value::Value;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

/// Type name without module paths, `Vec<String>` rather than
/// `alloc::vec::Vec<alloc::string::String>`
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
            continue;
        }
        out.push(c);
        if !(c.is_alphanumeric() || c == '_') {
            segment_start = out.len();
        }
    }
    out
}

/// Deserialize with `serializer`, reporting a type mismatch when it
/// produced nothing and recorded no error of its own
pub fn deserialize_value<T>(
    serializer: &dyn Serializer<T>,
    value: &Value,
    context: &SerializerContext,
    errors: &mut ErrorContainer,
) -> Result<Option<T>> {
    let before = errors.len();
    let result = serializer.deserialize(value, context, errors)?;
    if result.is_none() && errors.len() == before {
        context.error(errors, ErrorKind::MismatchedTypes, mismatch_message::<T>(value));
    }
    Ok(result)
}

pub(crate) fn mismatch_message<T>(value: &Value) -> String {
    format!(
        "Could not deserialize ({}) '{}' as {}",
        value.kind(),
        value,
        short_type_name::<T>()
    )
}

/// Integers and floats, from numbers or numeric strings.
///
/// Integers are clamped into the target type's range.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberSerializer;

impl NumberSerializer {
    fn read(value: &Value, context: &SerializerContext, errors: &mut ErrorContainer) -> Option<Number> {
        match value {
            Value::Number(n) => Some(*n),
            Value::String(s) => match number::parse(s) {
                Ok(n) => Some(n),
                Err(e) => {
                    context.error(errors, ErrorKind::Custom, e.to_string());
                    None
                }
            },
            _ => None,
        }
    }
}

macro_rules! integer_serializers {
    ($($ty:ty),*) => {
        $(
            impl Serializer<$ty> for NumberSerializer {
                fn serialize(&self, value: &$ty, _context: &SerializerContext) -> Result<Value> {
                    Ok(Value::Number(Number::from(*value)))
                }

                fn deserialize(
                    &self,
                    value: &Value,
                    context: &SerializerContext,
                    errors: &mut ErrorContainer,
                ) -> Result<Option<$ty>> {
                    Ok(Self::read(value, context, errors)
                        .map(|n| n.clamp(<$ty>::MIN as i128, <$ty>::MAX as i128) as $ty))
                }
            }

            impl Serializable for $ty {
                fn serializer(_context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
                    Arc::new(NumberSerializer)
                }
            }
        )*
    };
}

integer_serializers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl Serializer<f64> for NumberSerializer {
    fn serialize(&self, value: &f64, _context: &SerializerContext) -> Result<Value> {
        Ok(Value::Number(Number::Float(*value)))
    }

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<f64>> {
        Ok(Self::read(value, context, errors).map(|n| n.as_f64()))
    }
}

impl Serializer<f32> for NumberSerializer {
    fn serialize(&self, value: &f32, _context: &SerializerContext) -> Result<Value> {
        // Go through the shortest decimal form so 0.1f32 is written as 0.1
        let widened = value.to_string().parse::<f64>().unwrap_or(*value as f64);
        Ok(Value::Number(Number::Float(widened)))
    }

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<f32>> {
        Ok(Self::read(value, context, errors).map(|n| n.as_f64() as f32))
    }
}

impl Serializable for f64 {
    fn serializer(_context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(NumberSerializer)
    }
}

impl Serializable for f32 {
    fn serializer(_context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(NumberSerializer)
    }
}

/// Booleans, or the strings `true`/`false` in any case
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolSerializer;

impl Serializer<bool> for BoolSerializer {
    fn serialize(&self, value: &bool, _context: &SerializerContext) -> Result<Value> {
        Ok(Value::Bool(*value))
    }

    fn deserialize(
        &self,
        value: &Value,
        _context: &SerializerContext,
        _errors: &mut ErrorContainer,
    ) -> Result<Option<bool>> {
        Ok(match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        })
    }
}

impl Serializable for bool {
    fn serializer(_context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(BoolSerializer)
    }
}

/// Strings and the types written as plain strings
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Serializer<String> for StringSerializer {
    fn serialize(&self, value: &String, _context: &SerializerContext) -> Result<Value> {
        Ok(Value::String(value.clone()))
    }

    fn deserialize(
        &self,
        value: &Value,
        _context: &SerializerContext,
        _errors: &mut ErrorContainer,
    ) -> Result<Option<String>> {
        Ok(value.as_str().map(str::to_string))
    }
}

impl Serializer<char> for StringSerializer {
    fn serialize(&self, value: &char, _context: &SerializerContext) -> Result<Value> {
        Ok(Value::String(value.to_string()))
    }

    fn deserialize(
        &self,
        value: &Value,
        _context: &SerializerContext,
        _errors: &mut ErrorContainer,
    ) -> Result<Option<char>> {
        let Some(s) = value.as_str() else {
            return Ok(None);
        };
        let mut chars = s.chars();
        Ok(match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        })
    }
}

impl Serializer<PathBuf> for StringSerializer {
    fn serialize(&self, value: &PathBuf, _context: &SerializerContext) -> Result<Value> {
        Ok(Value::String(value.to_string_lossy().into_owned()))
    }

    fn deserialize(
        &self,
        value: &Value,
        _context: &SerializerContext,
        _errors: &mut ErrorContainer,
    ) -> Result<Option<PathBuf>> {
        Ok(value.as_str().map(PathBuf::from))
    }
}

impl Serializer<Uuid> for StringSerializer {
    fn serialize(&self, value: &Uuid, _context: &SerializerContext) -> Result<Value> {
        Ok(Value::String(value.to_string()))
    }

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<Uuid>> {
        let Some(s) = value.as_str() else {
            return Ok(None);
        };
        match Uuid::parse_str(s) {
            Ok(uuid) => Ok(Some(uuid)),
            Err(_) => {
                context.error(errors, ErrorKind::Custom, format!("Invalid UUID string: {}", s));
                Ok(None)
            }
        }
    }
}

impl Serializer<Url> for StringSerializer {
    fn serialize(&self, value: &Url, _context: &SerializerContext) -> Result<Value> {
        Ok(Value::String(value.to_string()))
    }

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<Url>> {
        let Some(s) = value.as_str() else {
            return Ok(None);
        };
        match Url::parse(s) {
            Ok(url) => Ok(Some(url)),
            Err(_) => {
                context.error(errors, ErrorKind::Custom, format!("Malformed URL: {}", s));
                Ok(None)
            }
        }
    }
}

macro_rules! string_serializable {
    ($($ty:ty),*) => {
        $(
            impl Serializable for $ty {
                fn serializer(_context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
                    Arc::new(StringSerializer)
                }
            }
        )*
    };
}

string_serializable!(String, char, PathBuf, Uuid, Url);

/// Timestamps as milliseconds since the Unix epoch.
///
/// Numeric strings and RFC 3339 strings are accepted when reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampSerializer;

impl Serializer<DateTime<Utc>> for TimestampSerializer {
    fn serialize(&self, value: &DateTime<Utc>, _context: &SerializerContext) -> Result<Value> {
        Ok(Value::Number(Number::from(value.timestamp_millis())))
    }

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<DateTime<Utc>>> {
        let millis = match value {
            Value::Number(n) => n.as_i128(),
            Value::String(s) => {
                if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
                    return Ok(Some(parsed.with_timezone(&Utc)));
                }
                match number::parse(s) {
                    Ok(n) => n.as_i128(),
                    Err(e) => {
                        context.error(errors, ErrorKind::Custom, e.to_string());
                        return Ok(None);
                    }
                }
            }
            _ => return Ok(None),
        };

        let timestamp = i64::try_from(millis)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis);
        if timestamp.is_none() {
            context.error(
                errors,
                ErrorKind::Custom,
                format!("Timestamp out of range: {}", millis),
            );
        }
        Ok(timestamp)
    }
}

impl Serializable for DateTime<Utc> {
    fn serializer(_context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(TimestampSerializer)
    }
}

/// `None` is written as null; null reads back as `None`
pub struct OptionSerializer<T> {
    inner: Arc<dyn Serializer<T>>,
}

impl<T> OptionSerializer<T> {
    pub fn new(inner: Arc<dyn Serializer<T>>) -> Self {
        Self { inner }
    }
}

impl<T> Serializer<Option<T>> for OptionSerializer<T> {
    fn serialize(&self, value: &Option<T>, context: &SerializerContext) -> Result<Value> {
        match value {
            Some(inner) => self.inner.serialize(inner, context),
            None => Ok(Value::Null),
        }
    }

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<Option<T>>> {
        if value.is_null() {
            return Ok(Some(None));
        }
        Ok(self.inner.deserialize(value, context, errors)?.map(Some))
    }
}

impl<T: Serializable> Serializable for Option<T> {
    const OPTIONAL: bool = true;

    fn serializer(context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(OptionSerializer::new(context.serializer_for::<T>()))
    }
}

/// Sequences and sets, written as arrays.
///
/// Elements that cannot be read are reported and left out.
pub struct CollectionSerializer<C, T> {
    element: Arc<dyn Serializer<T>>,
    _collection: PhantomData<fn() -> C>,
}

impl<C, T> CollectionSerializer<C, T> {
    pub fn new(element: Arc<dyn Serializer<T>>) -> Self {
        Self {
            element,
            _collection: PhantomData,
        }
    }
}

impl<C, T> Serializer<C> for CollectionSerializer<C, T>
where
    C: FromIterator<T>,
    for<'a> &'a C: IntoIterator<Item = &'a T>,
{
    fn serialize(&self, value: &C, context: &SerializerContext) -> Result<Value> {
        let mut items = Vec::new();
        for (i, item) in value.into_iter().enumerate() {
            items.push(self.element.serialize(item, &context.with_key(&i.to_string()))?);
        }
        Ok(Value::Array(items))
    }

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<C>> {
        let Some(items) = value.as_array() else {
            return Ok(None);
        };
        let mut collected = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_context = context.with_key(&i.to_string());
            if let Some(element) =
                deserialize_value(self.element.as_ref(), item, &item_context, errors)?
            {
                collected.push(element);
            }
        }
        Ok(Some(collected.into_iter().collect()))
    }
}

impl<T: Serializable> Serializable for Vec<T> {
    fn serializer(context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(CollectionSerializer::<Self, T>::new(context.serializer_for::<T>()))
    }
}

impl<T: Serializable> Serializable for VecDeque<T> {
    fn serializer(context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(CollectionSerializer::<Self, T>::new(context.serializer_for::<T>()))
    }
}

impl<T: Serializable + Eq + Hash> Serializable for HashSet<T> {
    fn serializer(context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(CollectionSerializer::<Self, T>::new(context.serializer_for::<T>()))
    }
}

impl<T: Serializable + Ord> Serializable for BTreeSet<T> {
    fn serializer(context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(CollectionSerializer::<Self, T>::new(context.serializer_for::<T>()))
    }
}

/// Types usable as map keys
pub trait MapKey: Sized + Send + Sync + 'static {
    fn to_key(&self) -> String;

    /// Parse a key, recording an error when it is not valid
    fn from_key(key: &str, context: &SerializerContext, errors: &mut ErrorContainer) -> Option<Self>;
}

impl MapKey for String {
    fn to_key(&self) -> String {
        self.clone()
    }

    fn from_key(key: &str, _context: &SerializerContext, _errors: &mut ErrorContainer) -> Option<Self> {
        Some(key.to_string())
    }
}

impl<E: ConfigEnum> MapKey for E {
    fn to_key(&self) -> String {
        enum_key(*self)
    }

    fn from_key(key: &str, context: &SerializerContext, errors: &mut ErrorContainer) -> Option<Self> {
        lookup_enum(key, context, errors)
    }
}

/// Maps with [`MapKey`] keys, written as sections.
///
/// Entries whose key or value cannot be read are reported and left out.
pub struct MapSerializer<M, K, V> {
    value: Arc<dyn Serializer<V>>,
    sort_keys: bool,
    _map: PhantomData<fn() -> (M, K)>,
}

impl<M, K, V> MapSerializer<M, K, V> {
    /// `sort_keys` orders written entries by key, for maps without a
    /// stable iteration order
    pub fn new(value: Arc<dyn Serializer<V>>, sort_keys: bool) -> Self {
        Self {
            value,
            sort_keys,
            _map: PhantomData,
        }
    }
}

impl<M, K, V> Serializer<M> for MapSerializer<M, K, V>
where
    M: FromIterator<(K, V)>,
    for<'a> &'a M: IntoIterator<Item = (&'a K, &'a V)>,
    K: MapKey,
{
    fn serialize(&self, value: &M, context: &SerializerContext) -> Result<Value> {
        let mut entries = Vec::new();
        for (key, item) in value {
            let key = key.to_key();
            let item = self.value.serialize(item, &context.with_key(&key))?;
            entries.push((key, item));
        }
        if self.sort_keys {
            entries.sort_by(|a, b| a.0.cmp(&b.0));
        }
        Ok(Value::Map(entries.into_iter().collect::<Section>()))
    }

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<M>> {
        let Some(section) = value.as_section() else {
            return Ok(None);
        };
        let mut collected = Vec::with_capacity(section.len());
        for (key, item) in section.iter() {
            let item_context = context.with_key(key);
            let Some(parsed_key) = K::from_key(key, &item_context, errors) else {
                continue;
            };
            if let Some(parsed) = deserialize_value(self.value.as_ref(), item, &item_context, errors)? {
                collected.push((parsed_key, parsed));
            }
        }
        Ok(Some(collected.into_iter().collect()))
    }
}

impl<K, V> Serializable for HashMap<K, V>
where
    K: MapKey + Eq + Hash,
    V: Serializable,
{
    fn serializer(context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(MapSerializer::<Self, K, V>::new(context.serializer_for::<V>(), true))
    }
}

impl<K, V> Serializable for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Serializable,
{
    fn serializer(context: &SerializerContext) -> Arc<dyn Serializer<Self>> {
        Arc::new(MapSerializer::<Self, K, V>::new(context.serializer_for::<V>(), false))
    }
}

/// Fieldless enums usable in configurations.
///
/// Implemented by [`crate::config_enum!`].
pub trait ConfigEnum: Copy + Eq + Send + Sync + 'static {
    fn variants() -> &'static [Self];

    /// Variant identifier as written in the source
    fn name(&self) -> &'static str;
}

/// Key a variant is written as
pub fn enum_key<E: ConfigEnum>(variant: E) -> String {
    SnakeCase.format(variant.name())
}

fn normalize_enum_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn lookup_enum<E: ConfigEnum>(
    name: &str,
    context: &SerializerContext,
    errors: &mut ErrorContainer,
) -> Option<E> {
    let wanted = normalize_enum_name(name);
    let found = E::variants()
        .iter()
        .copied()
        .find(|v| normalize_enum_name(v.name()) == wanted);
    if found.is_none() {
        context.error(
            errors,
            ErrorKind::Custom,
            format!("No enum constant {}.{}", short_type_name::<E>(), name),
        );
    }
    found
}

/// Enum variants as snake_case strings, read back ignoring case, `_` and `-`
pub struct EnumSerializer<E> {
    _enum: PhantomData<fn() -> E>,
}

impl<E> EnumSerializer<E> {
    pub fn new() -> Self {
        Self {
            _enum: PhantomData,
        }
    }
}

impl<E> Default for EnumSerializer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ConfigEnum> Serializer<E> for EnumSerializer<E> {
    fn serialize(&self, value: &E, _context: &SerializerContext) -> Result<Value> {
        Ok(Value::String(enum_key(*value)))
    }

    fn deserialize(
        &self,
        value: &Value,
        context: &SerializerContext,
        errors: &mut ErrorContainer,
    ) -> Result<Option<E>> {
        Ok(match value.as_str() {
            Some(name) => lookup_enum(name, context, errors),
            None => None,
        })
    }
}

/// Declare a fieldless enum usable as a configuration value or map key.
///
/// The enum derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
/// `PartialOrd` and `Ord`.
///
/// ```
/// cogwheel_core::config_enum! {
///     pub enum Difficulty {
///         Peaceful,
///         Easy,
///         HardCore,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $crate::serializers::ConfigEnum for $name {
            fn variants() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl $crate::serializer::Serializable for $name {
            fn serializer(
                _context: &$crate::serializer::SerializerContext,
            ) -> ::std::sync::Arc<dyn $crate::serializer::Serializer<Self>> {
                ::std::sync::Arc::new($crate::serializers::EnumSerializer::<$name>::new())
            }
        }
    };
}
