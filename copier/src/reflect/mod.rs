//! Introspection capability used by the copy engine
//!
//! Every value the engine touches implements [`Reflect`]. A reflected value exposes one of
//! five views through [`ReflectRef`] / [`ReflectMut`]:
//!
//! - [`Record`]: struct-like, members described by a cached `RecordShape`
//! - [`Mapping`]: string-keyed map
//! - [`Sequence`]: ordered list
//! - [`Optional`]: `Option<T>`
//! - opaque value: primitives and strings, assigned whole
//!
//! Records get their implementation from `#[derive(Record)]`. Primitives, `String`, `Option`,
//! `Vec` and `String`-keyed maps are covered here, along with the schemaless [`DynamicMap`]
//! and [`DynamicList`].

mod dynamic;
mod impls;
mod json;

use std::any::Any;
use std::fmt;

pub use dynamic::{DynamicList, DynamicMap};

use crate::error::Result;
use crate::shape::{MethodShape, RecordShape};
use crate::type_key::{TypeKey, TypeKind};

/// A value the copy engine can inspect and write
pub trait Reflect: Any {
    /// Semantic type of this value
    fn type_key(&self) -> TypeKey;

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcast to a `Reflect` trait object
    fn as_reflect(&self) -> &dyn Reflect;

    /// Read-only structural view
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Mutable structural view
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Owned copy of this value
    fn clone_value(&self) -> Box<dyn Reflect>;

    /// Overwrite `self` with `value` when both have the same type
    ///
    /// Returns `false` and leaves `self` untouched on a type mismatch.
    fn assign(&mut self, value: &dyn Reflect) -> bool;

    /// Whether this is the zero value of its type (`0`, `""`, `false`, empty, `None`)
    fn is_empty_value(&self) -> bool;
}

impl dyn Reflect {
    /// Whether the concrete type is `T`
    pub fn is<T: Reflect>(&self) -> bool { self.as_any().is::<T>() }

    /// Borrow as the concrete type `T`
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> { self.as_any().downcast_ref::<T>() }

    /// Mutably borrow as the concrete type `T`
    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Structural kind of this value
    pub fn kind(&self) -> TypeKind { self.reflect_ref().kind() }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reflect").field(&self.type_key()).finish()
    }
}

impl Clone for Box<dyn Reflect> {
    fn clone(&self) -> Self { self.clone_value() }
}

/// Read-only view of a reflected value
pub enum ReflectRef<'a> {
    /// Struct-like record
    Record(&'a dyn Record),
    /// String-keyed mapping
    Mapping(&'a dyn Mapping),
    /// Ordered sequence
    Sequence(&'a dyn Sequence),
    /// `Option<T>`, carrying the inner value when present
    Optional(Option<&'a dyn Reflect>),
    /// Opaque leaf value
    Value(&'a dyn Reflect),
}

impl ReflectRef<'_> {
    /// Kind of the viewed value
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Record(_) => TypeKind::Record,
            Self::Mapping(_) => TypeKind::Mapping,
            Self::Sequence(_) => TypeKind::Sequence,
            Self::Optional(_) => TypeKind::Optional,
            Self::Value(_) => TypeKind::Value,
        }
    }
}

/// Mutable view of a reflected value
pub enum ReflectMut<'a> {
    /// Struct-like record
    Record(&'a mut dyn Record),
    /// String-keyed mapping
    Mapping(&'a mut dyn Mapping),
    /// Ordered sequence
    Sequence(&'a mut dyn Sequence),
    /// `Option<T>`
    Optional(&'a mut dyn Optional),
    /// Opaque leaf value
    Value(&'a mut dyn Reflect),
}

impl ReflectMut<'_> {
    /// Kind of the viewed value
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Record(_) => TypeKind::Record,
            Self::Mapping(_) => TypeKind::Mapping,
            Self::Sequence(_) => TypeKind::Sequence,
            Self::Optional(_) => TypeKind::Optional,
            Self::Value(_) => TypeKind::Value,
        }
    }
}

/// Struct-like value with named members
///
/// Implemented by `#[derive(Record)]`. Member indexes refer to declaration order in the
/// record's `RecordShape`; setter and getter indexes refer to the shape's setter and getter
/// lists respectively.
pub trait Record: Reflect {
    /// Introspect this record's type
    ///
    /// Called once per type by the `ShapeCache`; everything else reads the cached shape.
    fn build_shape(&self) -> Result<RecordShape>;

    /// Borrow the member at `index`, `None` for ignored or unknown members
    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    /// Mutably borrow the member at `index`, `None` for ignored or unknown members
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Invoke the setter at `index` with `value`
    ///
    /// Returns `false` when `value` is not of the setter's parameter type.
    fn call_setter(&mut self, index: usize, value: &dyn Reflect) -> bool;

    /// Invoke the getter at `index`
    fn call_getter(&self, index: usize) -> Option<Box<dyn Reflect>>;
}

/// Setter and getter methods of a record
///
/// `#[derive(Record)]` emits an empty impl; records marked `#[copier(methods)]` get theirs
/// from `#[struct_copier::methods]` on an inherent impl block instead.
pub trait RecordMethods {
    /// Signatures of the declared setters and getters
    fn method_shapes() -> Vec<MethodShape>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Invoke the setter at `index`
    fn call_setter(&mut self, index: usize, value: &dyn Reflect) -> bool {
        let _ = (index, value);
        false
    }

    /// Invoke the getter at `index`
    fn call_getter(&self, index: usize) -> Option<Box<dyn Reflect>> {
        let _ = index;
        None
    }
}

/// String-keyed mapping
pub trait Mapping: Reflect {
    /// Number of entries
    fn len(&self) -> usize;

    /// Whether the mapping has no entries
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// All entries, in no particular order
    fn entries(&self) -> Vec<(&str, &dyn Reflect)>;

    /// Borrow the value under `key`
    fn get(&self, key: &str) -> Option<&dyn Reflect>;

    /// Whether `key` is present
    fn contains_key(&self, key: &str) -> bool { self.get(key).is_some() }

    /// Declared value type, `None` when any type is accepted
    fn value_type(&self) -> Option<TypeKey>;

    /// Mutable slot for `key`, inserting a default value when absent
    ///
    /// Mappings without a declared value type only return existing slots.
    fn slot(&mut self, key: &str) -> Option<&mut dyn Reflect>;

    /// Store a copy of `value` under `key`, `false` when the value type does not fit
    fn insert_value(&mut self, key: &str, value: &dyn Reflect) -> bool;

    /// Remove `key`
    fn remove(&mut self, key: &str);
}

/// Ordered sequence
pub trait Sequence: Reflect {
    /// Number of elements
    fn len(&self) -> usize;

    /// Whether the sequence has no elements
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Borrow the element at `index`
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Mutably borrow the element at `index`
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Declared element type, `None` when any type is accepted
    fn element_type(&self) -> Option<TypeKey>;

    /// Shorten to `len` elements; no effect when already shorter
    fn truncate(&mut self, len: usize);

    /// Append a default element, `false` when the sequence cannot create one
    fn push_default(&mut self) -> bool;

    /// Append a copy of `value`, `false` when the element type does not fit
    fn push_value(&mut self, value: &dyn Reflect) -> bool;
}

/// `Option<T>` destination
pub trait Optional: Reflect {
    /// Type of the wrapped value
    fn inner_type(&self) -> TypeKey;

    /// Set to `Some(value)`, `false` when `value` is not of the inner type
    fn assign_some(&mut self, value: &dyn Reflect) -> bool;
}

/// Assign `value` into `slot` when it is a `T`
///
/// Shared by the built-in impls and the code generated by `#[derive(Record)]`.
#[doc(hidden)]
pub fn assign_concrete<T: Reflect + Clone>(slot: &mut T, value: &dyn Reflect) -> bool {
    match value.as_any().downcast_ref::<T>() {
        Some(value) => {
            slot.clone_from(value);
            true
        }
        None => false,
    }
}
