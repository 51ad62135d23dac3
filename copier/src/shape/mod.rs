//! Record shapes: the introspected, immutable description of a record type
//!
//! A shape lists the record's members in declaration order together with their parsed tag
//! directives, plus the setter and getter methods declared through `#[methods]`. Shapes are
//! built once per type and shared through the [`ShapeCache`].

mod cache;
mod tag;

use std::collections::HashMap;

pub use cache::ShapeCache;
pub use tag::{MemberTag, TagDirective, TagError};

use crate::error::{Error, Result};
use crate::type_key::TypeKey;

/// One declared member of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberShape {
    /// Position in declaration order, used to address the member on the record
    pub index:          usize,
    /// Declared field name
    pub name:           String,
    /// Name the member is matched under (rename applied)
    pub effective_name: String,
    /// Declared field type
    pub type_key:       TypeKey,
    /// Naming directive parsed from the member's tag
    pub directive:      TagDirective,
    /// Destination must be populated by some source member
    pub required:       bool,
}

impl MemberShape {
    /// Whether the member is excluded from reading and writing
    pub fn is_ignored(&self) -> bool { self.directive == TagDirective::Ignore }
}

/// Role of a method exposed as a virtual member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// `&mut self` with exactly one argument and no return value
    Setter,
    /// `&self` with no arguments returning a value
    Getter,
}

/// Signature of a setter or getter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodShape {
    /// Method name, which is also the virtual member name
    pub name:     String,
    /// Setter or getter
    pub kind:     MethodKind,
    /// Parameter type of a setter, return type of a getter
    pub type_key: TypeKey,
}

impl MethodShape {
    /// Describe a setter taking a `type_key` argument
    pub fn setter(name: impl Into<String>, type_key: TypeKey) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Setter,
            type_key,
        }
    }

    /// Describe a getter returning `type_key`
    pub fn getter(name: impl Into<String>, type_key: TypeKey) -> Self {
        Self {
            name: name.into(),
            kind: MethodKind::Getter,
            type_key,
        }
    }
}

/// Introspected structure of a record type
#[derive(Debug)]
pub struct RecordShape {
    type_key:     TypeKey,
    members:      Vec<MemberShape>,
    setters:      Vec<MethodShape>,
    getters:      Vec<MethodShape>,
    field_index:  HashMap<String, usize>,
    setter_index: HashMap<String, usize>,
}

impl RecordShape {
    /// Start describing the record type `type_key`
    pub const fn builder(type_key: TypeKey) -> RecordShapeBuilder {
        RecordShapeBuilder {
            type_key,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Type this shape describes
    pub const fn type_key(&self) -> TypeKey { self.type_key }

    /// All members in declaration order, ignored ones included
    pub fn members(&self) -> &[MemberShape] { &self.members }

    /// Member at declaration position `index`
    pub fn member(&self, index: usize) -> Option<&MemberShape> { self.members.get(index) }

    /// Declared setters
    pub fn setters(&self) -> &[MethodShape] { &self.setters }

    /// Declared getters
    pub fn getters(&self) -> &[MethodShape] { &self.getters }

    /// Index of the non-ignored member matched under `name`
    pub fn field_by_name(&self, name: &str) -> Option<usize> { self.field_index.get(name).copied() }

    /// Index of the setter named `name`
    pub fn setter_by_name(&self, name: &str) -> Option<usize> { self.setter_index.get(name).copied() }

    /// Members tagged `must`
    pub fn required_members(&self) -> impl Iterator<Item = &MemberShape> {
        self.members.iter().filter(|member| member.required)
    }
}

/// Collects a record's members and methods, then validates them into a `RecordShape`
#[derive(Debug)]
pub struct RecordShapeBuilder {
    type_key: TypeKey,
    fields:   Vec<(String, String, TypeKey)>,
    methods:  Vec<MethodShape>,
}

impl RecordShapeBuilder {
    /// Add the next declared field with its raw tag text
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, tag: impl Into<String>, type_key: TypeKey) -> Self {
        self.fields.push((name.into(), tag.into(), type_key));
        self
    }

    /// Add setter and getter signatures
    #[must_use]
    pub fn methods(mut self, methods: impl IntoIterator<Item = MethodShape>) -> Self {
        self.methods.extend(methods);
        self
    }

    /// Parse every tag and build the name indexes
    ///
    /// # Errors
    ///
    /// Returns a `Shape` error when a tag is malformed, two non-ignored members share an
    /// effective name, or two setters share a name.
    pub fn build(self) -> Result<RecordShape> {
        let type_name = self.type_key.name();
        let mut members = Vec::with_capacity(self.fields.len());
        let mut field_index = HashMap::new();

        for (index, (name, tag, type_key)) in self.fields.into_iter().enumerate() {
            let MemberTag {
                directive,
                required,
            } = MemberTag::parse(&tag)
                .map_err(|error| Error::invalid(&format!("tag on {type_name}::{name}"), error))?;

            let effective_name = match &directive {
                TagDirective::Rename(renamed) => renamed.clone(),
                TagDirective::Default | TagDirective::Ignore => name.clone(),
            };

            if directive != TagDirective::Ignore
                && let Some(previous) = field_index.insert(effective_name.clone(), index)
            {
                let previous: &MemberShape = &members[previous];
                return Err(Error::cannot(
                    &format!("describe {type_name}"),
                    format!(
                        "members '{}' and '{name}' both match as '{effective_name}'",
                        previous.name
                    ),
                )
                .into());
            }

            members.push(MemberShape {
                index,
                name,
                effective_name,
                type_key,
                directive,
                required,
            });
        }

        let (setters, getters): (Vec<_>, Vec<_>) = self
            .methods
            .into_iter()
            .partition(|method| method.kind == MethodKind::Setter);

        let mut setter_index = HashMap::new();
        for (index, setter) in setters.iter().enumerate() {
            if setter_index.insert(setter.name.clone(), index).is_some() {
                return Err(Error::cannot(
                    &format!("describe {type_name}"),
                    format!("setter '{}' is declared twice", setter.name),
                )
                .into());
            }
        }

        Ok(RecordShape {
            type_key: self.type_key,
            members,
            setters,
            getters,
            field_index,
            setter_index,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, reason = "tests fail loudly on unexpected errors")]
mod tests {
    use super::*;

    struct Marker;

    fn builder() -> RecordShapeBuilder { RecordShape::builder(TypeKey::of::<Marker>()) }

    #[test]
    fn build_applies_tags() {
        let shape = builder()
            .field("field_a", "FieldB", TypeKey::of::<String>())
            .field("secret", "-", TypeKey::of::<String>())
            .field("id", "must", TypeKey::of::<u64>())
            .methods([MethodShape::setter("role", TypeKey::of::<String>())])
            .build();
        let shape = shape.expect("shape should build");

        assert_eq!(shape.field_by_name("FieldB"), Some(0));
        assert_eq!(shape.field_by_name("field_a"), None);
        assert_eq!(shape.field_by_name("secret"), None);
        assert!(shape.member(1).is_some_and(MemberShape::is_ignored));
        assert_eq!(shape.required_members().count(), 1);
        assert_eq!(shape.setter_by_name("role"), Some(0));
        assert!(shape.getters().is_empty());
    }

    #[test]
    fn methods_split_by_kind_keeping_order() {
        let shape = builder()
            .methods([
                MethodShape::getter("full_name", TypeKey::of::<String>()),
                MethodShape::setter("role", TypeKey::of::<String>()),
                MethodShape::setter("level", TypeKey::of::<i64>()),
            ])
            .build();
        let shape = shape.expect("shape should build");

        assert_eq!(shape.setter_by_name("level"), Some(1));
        assert_eq!(shape.getters().len(), 1);
        assert_eq!(shape.getters()[0].name, "full_name");
    }

    #[test]
    fn duplicate_effective_names_are_ambiguous() {
        let shape = builder()
            .field("first", "Name", TypeKey::of::<String>())
            .field("Name", "", TypeKey::of::<String>())
            .build();
        assert!(shape.is_err_and(|report| report.current_context().is_fatal()));
    }

    #[test]
    fn rename_onto_taken_name_collides_but_ignore_does_not() {
        let shape = builder()
            .field("name", "", TypeKey::of::<String>())
            .field("shadow", "rename:\"name\",", TypeKey::of::<String>())
            .field("hidden", "-", TypeKey::of::<String>())
            .build();
        assert!(shape.is_err());

        let shape = builder()
            .field("name", "", TypeKey::of::<String>())
            .field("name_copy", "-", TypeKey::of::<String>())
            .build();
        assert!(shape.is_ok());
    }

    #[test]
    fn malformed_tag_names_the_member() {
        let shape = builder().field("broken", "rename:oops", TypeKey::of::<String>()).build();
        let report = shape.expect_err("malformed tag should fail");
        assert!(report.current_context().to_string().contains("broken"));
    }
}
