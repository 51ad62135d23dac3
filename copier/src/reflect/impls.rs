//! `Reflect` implementations for std types

use std::any::Any;
use std::collections::{BTreeMap, HashMap};

use super::{Mapping, Optional, Reflect, ReflectMut, ReflectRef, Sequence, assign_concrete};
use crate::type_key::TypeKey;

/// Opaque leaf values: assigned whole, empty when equal to their default
macro_rules! impl_reflect_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_key(&self) -> TypeKey { TypeKey::of::<Self>() }

                fn as_any(&self) -> &dyn Any { self }

                fn as_any_mut(&mut self) -> &mut dyn Any { self }

                fn as_reflect(&self) -> &dyn Reflect { self }

                fn reflect_ref(&self) -> ReflectRef<'_> { ReflectRef::Value(self) }

                fn reflect_mut(&mut self) -> ReflectMut<'_> { ReflectMut::Value(self) }

                fn clone_value(&self) -> Box<dyn Reflect> { Box::new(self.clone()) }

                fn assign(&mut self, value: &dyn Reflect) -> bool { assign_concrete(self, value) }

                #[allow(clippy::float_cmp, reason = "exact comparison against the zero value")]
                fn is_empty_value(&self) -> bool { *self == <$ty as Default>::default() }
            }
        )*
    };
}

impl_reflect_value!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
);

impl<T: Reflect + Clone> Reflect for Option<T> {
    fn type_key(&self) -> TypeKey { TypeKey::of::<Self>() }

    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn as_reflect(&self) -> &dyn Reflect { self }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Optional(self.as_ref().map(Reflect::as_reflect))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> { ReflectMut::Optional(self) }

    fn clone_value(&self) -> Box<dyn Reflect> { Box::new(self.clone()) }

    fn assign(&mut self, value: &dyn Reflect) -> bool { assign_concrete(self, value) }

    fn is_empty_value(&self) -> bool { self.is_none() }
}

impl<T: Reflect + Clone> Optional for Option<T> {
    fn inner_type(&self) -> TypeKey { TypeKey::of::<T>() }

    fn assign_some(&mut self, value: &dyn Reflect) -> bool {
        match value.as_any().downcast_ref::<T>() {
            Some(value) => {
                *self = Some(value.clone());
                true
            }
            None => false,
        }
    }
}

impl<T: Reflect + Clone + Default> Reflect for Vec<T> {
    fn type_key(&self) -> TypeKey { TypeKey::of::<Self>() }

    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn as_reflect(&self) -> &dyn Reflect { self }

    fn reflect_ref(&self) -> ReflectRef<'_> { ReflectRef::Sequence(self) }

    fn reflect_mut(&mut self) -> ReflectMut<'_> { ReflectMut::Sequence(self) }

    fn clone_value(&self) -> Box<dyn Reflect> { Box::new(self.clone()) }

    fn assign(&mut self, value: &dyn Reflect) -> bool { assign_concrete(self, value) }

    fn is_empty_value(&self) -> bool { self.is_empty() }
}

impl<T: Reflect + Clone + Default> Sequence for Vec<T> {
    fn len(&self) -> usize { <[T]>::len(self) }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        <[T]>::get(self, index).map(Reflect::as_reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        <[T]>::get_mut(self, index).map(|element| element as &mut dyn Reflect)
    }

    fn element_type(&self) -> Option<TypeKey> { Some(TypeKey::of::<T>()) }

    fn truncate(&mut self, len: usize) { Self::truncate(self, len); }

    fn push_default(&mut self) -> bool {
        self.push(T::default());
        true
    }

    fn push_value(&mut self, value: &dyn Reflect) -> bool {
        match value.as_any().downcast_ref::<T>() {
            Some(value) => {
                self.push(value.clone());
                true
            }
            None => false,
        }
    }
}

/// String-keyed maps with a concrete value type
macro_rules! impl_reflect_mapping {
    ($map:ident) => {
        impl<V: Reflect + Clone + Default> Reflect for $map<String, V> {
            fn type_key(&self) -> TypeKey { TypeKey::of::<Self>() }

            fn as_any(&self) -> &dyn Any { self }

            fn as_any_mut(&mut self) -> &mut dyn Any { self }

            fn as_reflect(&self) -> &dyn Reflect { self }

            fn reflect_ref(&self) -> ReflectRef<'_> { ReflectRef::Mapping(self) }

            fn reflect_mut(&mut self) -> ReflectMut<'_> { ReflectMut::Mapping(self) }

            fn clone_value(&self) -> Box<dyn Reflect> { Box::new(self.clone()) }

            fn assign(&mut self, value: &dyn Reflect) -> bool { assign_concrete(self, value) }

            fn is_empty_value(&self) -> bool { self.is_empty() }
        }

        impl<V: Reflect + Clone + Default> Mapping for $map<String, V> {
            fn len(&self) -> usize { Self::len(self) }

            fn entries(&self) -> Vec<(&str, &dyn Reflect)> {
                self.iter()
                    .map(|(key, value)| (key.as_str(), value.as_reflect()))
                    .collect()
            }

            fn get(&self, key: &str) -> Option<&dyn Reflect> {
                Self::get(self, key).map(Reflect::as_reflect)
            }

            fn value_type(&self) -> Option<TypeKey> { Some(TypeKey::of::<V>()) }

            fn slot(&mut self, key: &str) -> Option<&mut dyn Reflect> {
                Some(self.entry(key.to_owned()).or_default() as &mut dyn Reflect)
            }

            fn insert_value(&mut self, key: &str, value: &dyn Reflect) -> bool {
                match value.as_any().downcast_ref::<V>() {
                    Some(value) => {
                        self.insert(key.to_owned(), value.clone());
                        true
                    }
                    None => false,
                }
            }

            fn remove(&mut self, key: &str) { Self::remove(self, key); }
        }
    };
}

impl_reflect_mapping!(BTreeMap);
impl_reflect_mapping!(HashMap);
