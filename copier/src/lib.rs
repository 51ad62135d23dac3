//! Copy values between records, keyed maps and sequences by member name
//!
//! `struct_copier` fills a destination value from a source value, matching members by name.
//! Sources and destinations are anything implementing [`Reflect`]: structs deriving
//! [`Record`], `String`-keyed `BTreeMap`/`HashMap`s, `Vec`s, and the schemaless
//! [`DynamicMap`]/[`DynamicList`] (which can be built from a parsed `serde_json::Value`).
//!
//! # Usage
//!
//! ```
//! use struct_copier::{Converter, CopyOptions, DynamicMap, Record, copy_with_options};
//!
//! #[derive(Debug, Clone, Default, Record)]
//! #[copier(rename_all = "PascalCase", methods)]
//! struct Employee {
//!     field_string:     String,
//!     field_int:        i64,
//!     #[copier("-")]
//!     field_tag_ignore: String,
//!     super_rule:       String,
//! }
//!
//! #[struct_copier::methods(rename_all = "PascalCase")]
//! impl Employee {
//!     fn role(&mut self, role: String) { self.super_rule = format!("Super {role}"); }
//! }
//!
//! fn main() -> struct_copier::Result<()> {
//!     let source = DynamicMap::new()
//!         .with("FieldString", "aaa".to_string())
//!         .with("FieldInt", "11".to_string())
//!         .with("FieldTagIgnore", "new".to_string())
//!         .with("Role", "role".to_string());
//!
//!     let mut employee = Employee {
//!         field_tag_ignore: "orig".to_string(),
//!         ..Employee::default()
//!     };
//!     let options = CopyOptions::new()
//!         .with_converter(Converter::from_fn(|text: &String| text.parse::<i64>()));
//!     copy_with_options(&mut employee, &source, &options)?;
//!
//!     assert_eq!(employee.field_string, "aaa");
//!     assert_eq!(employee.field_int, 11);
//!     assert_eq!(employee.field_tag_ignore, "orig");
//!     assert_eq!(employee.super_rule, "Super role");
//!     Ok(())
//! }
//! ```
//!
//! # Matching
//!
//! A source member named `N` goes to the destination field whose effective name is exactly
//! `N` (its declared name, or the name given by `rename`/`rename_all`), else to the setter
//! named `N`, else nowhere. Ignored fields are never read or written. Unmatched members are
//! skipped silently.
//!
//! # Copying one member
//!
//! Identical types are assigned; records and mappings recurse; sequences copy element-wise;
//! otherwise a [`Converter`] registered for the exact type pair is applied. Failures of
//! individual members are collected and returned together as one [`Error::Aggregate`], after
//! every other member has been copied.

extern crate self as struct_copier;

mod constants;
mod converter;
mod copy;
mod error;
mod options;
pub mod reflect;
mod resolver;
mod shape;
mod type_key;

pub use constants::DEFAULT_MAX_DEPTH;
pub use converter::{ConvertFn, Converter, ConverterRegistry};
pub use copy::{copy, copy_with_options};
pub use error::{BoxError, Error, Result};
pub use options::{CopyOptions, CopySettings};
pub use reflect::{
    DynamicList, DynamicMap, Mapping, Optional, Record, RecordMethods, Reflect, ReflectMut,
    ReflectRef, Sequence,
};
pub use resolver::{Resolution, resolve};
pub use shape::{
    MemberShape, MemberTag, MethodKind, MethodShape, RecordShape, RecordShapeBuilder, ShapeCache,
    TagDirective, TagError,
};
pub use struct_copier_macros::{Record, methods};
pub use type_key::{TypeKey, TypeKind};
