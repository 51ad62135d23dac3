//! Pluggable conversions between two exact types
//!
//! A [`Converter`] turns a value of one `TypeKey` into a value of another. The
//! [`ConverterRegistry`] keys converters by the ordered `(source, destination)` pair; lookup
//! is exact-pair only and a later registration for the same pair replaces the earlier one.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::reflect::Reflect;
use crate::type_key::TypeKey;

/// Signature of a type-erased conversion
pub type ConvertFn = dyn Fn(&dyn Reflect) -> Result<Box<dyn Reflect>, BoxError> + Send + Sync;

/// One registered conversion
#[derive(Clone)]
pub struct Converter {
    source:      TypeKey,
    destination: TypeKey,
    func:        Arc<ConvertFn>,
}

impl Converter {
    /// Wrap a type-erased conversion
    ///
    /// `func` receives values whose type is `source` and must return values whose type is
    /// `destination`.
    pub fn new(
        source: TypeKey,
        destination: TypeKey,
        func: impl Fn(&dyn Reflect) -> Result<Box<dyn Reflect>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            source,
            destination,
            func: Arc::new(func),
        }
    }

    /// Wrap a typed conversion from `S` to `D`
    ///
    /// ```
    /// use struct_copier::Converter;
    ///
    /// let parse_int = Converter::from_fn(|text: &String| text.parse::<i64>());
    /// ```
    pub fn from_fn<S, D, E>(func: impl Fn(&S) -> Result<D, E> + Send + Sync + 'static) -> Self
    where
        S: Reflect,
        D: Reflect,
        E: Into<BoxError>,
    {
        Self::new(TypeKey::of::<S>(), TypeKey::of::<D>(), move |value| {
            let Some(typed) = value.downcast_ref::<S>() else {
                return Err(format!(
                    "converter expected {} but received {}",
                    TypeKey::of::<S>(),
                    value.type_key()
                )
                .into());
            };
            func(typed)
                .map(|converted| Box::new(converted) as Box<dyn Reflect>)
                .map_err(Into::into)
        })
    }

    /// Type this converter accepts
    pub const fn source(&self) -> TypeKey { self.source }

    /// Type this converter produces
    pub const fn destination(&self) -> TypeKey { self.destination }

    /// Run the conversion
    ///
    /// # Errors
    ///
    /// Returns whatever the wrapped function returns, or a failure when it produced a value
    /// of a type other than `destination`.
    pub fn convert(&self, value: &dyn Reflect) -> Result<Box<dyn Reflect>, BoxError> {
        let converted = (self.func)(value)?;
        if converted.type_key() != self.destination {
            return Err(format!(
                "converter to {} produced {}",
                self.destination,
                converted.type_key()
            )
            .into());
        }
        Ok(converted)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

/// Converters keyed by exact `(source, destination)` type pair
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<(TypeId, TypeId), Converter>,
}

impl ConverterRegistry {
    /// Create an empty registry
    pub fn new() -> Self { Self::default() }

    /// Insert `converter`, replacing any converter for the same pair
    pub fn register(&mut self, converter: Converter) {
        let key = (converter.source.id(), converter.destination.id());
        self.converters.insert(key, converter);
    }

    /// Insert a typed conversion from `S` to `D`
    pub fn register_fn<S, D, E>(&mut self, func: impl Fn(&S) -> Result<D, E> + Send + Sync + 'static)
    where
        S: Reflect,
        D: Reflect,
        E: Into<BoxError>,
    {
        self.register(Converter::from_fn(func));
    }

    /// Converter for exactly `source` into exactly `destination`
    pub fn lookup(&self, source: TypeKey, destination: TypeKey) -> Option<&Converter> {
        self.converters.get(&(source.id(), destination.id()))
    }

    /// Number of registered pairs
    pub fn len(&self) -> usize { self.converters.len() }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool { self.converters.is_empty() }
}

impl FromIterator<Converter> for ConverterRegistry {
    fn from_iter<I: IntoIterator<Item = Converter>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.extend(iter);
        registry
    }
}

impl Extend<Converter> for ConverterRegistry {
    fn extend<I: IntoIterator<Item = Converter>>(&mut self, iter: I) {
        for converter in iter {
            self.register(converter);
        }
    }
}
