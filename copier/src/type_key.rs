//! Semantic type identity and the coarse kind of a reflected value
//!
//! `TypeKey` is what converters are registered under and what the field copier compares
//! when deciding whether a value can be assigned directly. Two keys are equal exactly when
//! their `TypeId`s are; the name is carried only for diagnostics.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Identity of a concrete Rust type plus its printable name
#[derive(Clone, Copy)]
pub struct TypeKey {
    id:   TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key of `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id:   TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The underlying `TypeId`
    pub const fn id(&self) -> TypeId { self.id }

    /// Fully-qualified type name (e.g. `alloc::string::String`)
    pub const fn name(&self) -> &'static str { self.name }

    /// Last path segment of the type name, generics preserved
    /// For example: `alloc::vec::Vec<alloc::string::String>` returns `Vec<alloc::string::String>`
    pub fn short_name(&self) -> &'static str {
        let base_end = self.name.find('<').unwrap_or(self.name.len());
        let start = self.name[..base_end].rfind("::").map_or(0, |pos| pos + 2);
        &self.name[start..]
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state); }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name) }
}

/// Category of a reflected value for quick identification and dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString)]
#[serde(rename_all = "PascalCase")]
#[strum(serialize_all = "PascalCase")]
pub enum TypeKind {
    /// Keyed mapping (`BTreeMap<String, V>`, `HashMap<String, V>`, `DynamicMap`)
    Mapping,
    /// `Option<T>`
    Optional,
    /// Struct-like record described by a `RecordShape`
    Record,
    /// Ordered sequence (`Vec<T>`, `DynamicList`)
    Sequence,
    /// Opaque leaf value (primitives, `String`)
    Value,
}

impl TypeKind {
    /// Records and mappings are copied member by member
    pub const fn is_structured(self) -> bool { matches!(self, Self::Record | Self::Mapping) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_compare_by_type_identity() {
        assert_eq!(TypeKey::of::<String>(), TypeKey::of::<String>());
        assert_ne!(TypeKey::of::<i32>(), TypeKey::of::<i64>());
        assert_eq!(TypeKey::of::<String>().name(), "alloc::string::String");
    }

    #[test]
    fn short_name_strips_module_path() {
        assert_eq!(TypeKey::of::<String>().short_name(), "String");
        assert_eq!(TypeKey::of::<i64>().short_name(), "i64");
        assert_eq!(
            TypeKey::of::<Vec<String>>().short_name(),
            "Vec<alloc::string::String>"
        );
    }

    #[test]
    fn kind_round_trips_through_strings() {
        assert_eq!(TypeKind::Record.to_string(), "Record");
        assert_eq!("Mapping".parse::<TypeKind>().ok(), Some(TypeKind::Mapping));
        assert!(TypeKind::Record.is_structured());
        assert!(!TypeKind::Sequence.is_structured());
    }
}
