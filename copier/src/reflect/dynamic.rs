//! Heterogeneous containers for sources that have no Rust type of their own
//!
//! `DynamicMap` is the analogue of a string-keyed map of arbitrary values; `DynamicList` the
//! analogue of a list of arbitrary values. Both accept any `Reflect` value.

use std::any::Any;
use std::collections::BTreeMap;

use super::{Mapping, Reflect, ReflectMut, ReflectRef, Sequence, assign_concrete};
use crate::type_key::TypeKey;

/// String-keyed map of arbitrary reflected values
#[derive(Debug, Clone, Default)]
pub struct DynamicMap {
    entries: BTreeMap<String, Box<dyn Reflect>>,
}

impl DynamicMap {
    /// Create an empty map
    pub fn new() -> Self { Self::default() }

    /// Builder form of [`DynamicMap::insert`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Reflect) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert `value` under `key`, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Reflect) {
        self.entries.insert(key.into(), Box::new(value));
    }

    /// Insert an already boxed value
    pub fn insert_boxed(&mut self, key: impl Into<String>, value: Box<dyn Reflect>) {
        self.entries.insert(key.into(), value);
    }

    /// Borrow the value under `key`
    pub fn get(&self, key: &str) -> Option<&dyn Reflect> {
        self.entries.get(key).map(|value| &**value)
    }

    /// Borrow the value under `key` as a `T`
    pub fn get_as<T: Reflect>(&self, key: &str) -> Option<&T> {
        self.get(key).and_then(<dyn Reflect>::downcast_ref::<T>)
    }

    /// Remove and return the value under `key`
    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Reflect>> { self.entries.remove(key) }

    /// Number of entries
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Reflect)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), &**value))
    }
}

impl Reflect for DynamicMap {
    fn type_key(&self) -> TypeKey { TypeKey::of::<Self>() }

    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn as_reflect(&self) -> &dyn Reflect { self }

    fn reflect_ref(&self) -> ReflectRef<'_> { ReflectRef::Mapping(self) }

    fn reflect_mut(&mut self) -> ReflectMut<'_> { ReflectMut::Mapping(self) }

    fn clone_value(&self) -> Box<dyn Reflect> { Box::new(self.clone()) }

    fn assign(&mut self, value: &dyn Reflect) -> bool { assign_concrete(self, value) }

    fn is_empty_value(&self) -> bool { self.entries.is_empty() }
}

impl Mapping for DynamicMap {
    fn len(&self) -> usize { self.entries.len() }

    fn entries(&self) -> Vec<(&str, &dyn Reflect)> { self.iter().collect() }

    fn get(&self, key: &str) -> Option<&dyn Reflect> { Self::get(self, key) }

    fn value_type(&self) -> Option<TypeKey> { None }

    fn slot(&mut self, key: &str) -> Option<&mut dyn Reflect> {
        self.entries
            .get_mut(key)
            .map(|value| &mut **value as &mut dyn Reflect)
    }

    fn insert_value(&mut self, key: &str, value: &dyn Reflect) -> bool {
        self.entries.insert(key.to_owned(), value.clone_value());
        true
    }

    fn remove(&mut self, key: &str) { self.entries.remove(key); }
}

/// Ordered list of arbitrary reflected values
#[derive(Debug, Clone, Default)]
pub struct DynamicList {
    items: Vec<Box<dyn Reflect>>,
}

impl DynamicList {
    /// Create an empty list
    pub fn new() -> Self { Self::default() }

    /// Builder form of [`DynamicList::push`]
    #[must_use]
    pub fn with(mut self, value: impl Reflect) -> Self {
        self.push(value);
        self
    }

    /// Append `value`
    pub fn push(&mut self, value: impl Reflect) { self.items.push(Box::new(value)); }

    /// Append an already boxed value
    pub fn push_boxed(&mut self, value: Box<dyn Reflect>) { self.items.push(value); }

    /// Borrow the element at `index`
    pub fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.items.get(index).map(|value| &**value)
    }

    /// Number of elements
    pub fn len(&self) -> usize { self.items.len() }

    /// Whether the list has no elements
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Elements in order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Reflect> {
        self.items.iter().map(|value| &**value)
    }
}

impl Reflect for DynamicList {
    fn type_key(&self) -> TypeKey { TypeKey::of::<Self>() }

    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn as_reflect(&self) -> &dyn Reflect { self }

    fn reflect_ref(&self) -> ReflectRef<'_> { ReflectRef::Sequence(self) }

    fn reflect_mut(&mut self) -> ReflectMut<'_> { ReflectMut::Sequence(self) }

    fn clone_value(&self) -> Box<dyn Reflect> { Box::new(self.clone()) }

    fn assign(&mut self, value: &dyn Reflect) -> bool { assign_concrete(self, value) }

    fn is_empty_value(&self) -> bool { self.items.is_empty() }
}

impl Sequence for DynamicList {
    fn len(&self) -> usize { self.items.len() }

    fn get(&self, index: usize) -> Option<&dyn Reflect> { Self::get(self, index) }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.items
            .get_mut(index)
            .map(|value| &mut **value as &mut dyn Reflect)
    }

    fn element_type(&self) -> Option<TypeKey> { None }

    fn truncate(&mut self, len: usize) { self.items.truncate(len); }

    fn push_default(&mut self) -> bool { false }

    fn push_value(&mut self, value: &dyn Reflect) -> bool {
        self.items.push(value.clone_value());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_builder_keeps_concrete_types() {
        let map = DynamicMap::new()
            .with("FieldString", "aaa".to_string())
            .with("FieldInt", 11_i64);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get_as::<String>("FieldString").map(String::as_str), Some("aaa"));
        assert_eq!(map.get_as::<i64>("FieldInt"), Some(&11));
        assert!(map.get_as::<i32>("FieldInt").is_none());
    }

    #[test]
    fn cloned_map_is_independent() {
        let original = DynamicMap::new().with("name", "first".to_string());
        let mut copy = original.clone();
        copy.insert("name", "second".to_string());

        assert_eq!(original.get_as::<String>("name").map(String::as_str), Some("first"));
        assert_eq!(copy.get_as::<String>("name").map(String::as_str), Some("second"));
    }

    #[test]
    fn list_cannot_invent_default_elements() {
        let mut list = DynamicList::new().with(1_i64).with("two".to_string());
        assert!(!list.push_default());
        assert!(list.push_value(&3.0_f64));
        assert_eq!(list.len(), 3);
        assert!(list.get(1).is_some_and(|item| item.is::<String>()));
    }
}
