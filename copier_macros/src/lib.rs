//! Procedural macros for struct_copier

mod methods;
mod record;
mod shared;

use proc_macro::TokenStream;

/// Derives `Reflect` and `Record` for a non-generic struct with named fields.
///
/// # Field attributes
///
/// - `#[copier(rename = "Name")]` matches the field under `Name`
/// - `#[copier(ignore)]` or `#[copier("-")]` never reads or writes the field
/// - `#[copier(must)]` reports an error when a copy leaves the field unpopulated
/// - `#[copier("FieldB")]` is shorthand for `#[copier(rename = "FieldB")]`
///
/// # Container attributes
///
/// - `#[copier(rename_all = "PascalCase")]` converts every field name (`camelCase`,
///   `snake_case`, `SCREAMING_SNAKE_CASE` and `kebab-case` also work); an explicit `rename`
///   still wins
/// - `#[copier(methods)]` takes setters and getters from a `#[methods]` impl block instead of
///   declaring none
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Default, Record)]
/// #[copier(rename_all = "PascalCase", methods)]
/// struct Employee {
///     field_string: String,
///     #[copier("-")]
///     field_tag_ignore: String,
///     super_rule: String,
/// }
/// ```
///
/// This will generate:
/// - `Reflect`, reporting the struct as a record
/// - `Record`, describing each field with its canonical tag text (`rename:"FieldString"`, `-`)
/// - an empty `RecordMethods` unless `methods` is given
#[proc_macro_derive(Record, attributes(copier))]
pub fn derive_record(input: TokenStream) -> TokenStream { record::derive_record_impl(input) }

/// Exposes the setters and getters of an inherent impl block to the copy engine.
///
/// Setters take `&mut self` and one owned argument and return nothing; a source member with
/// the setter's name is passed to it. Getters take `&self` only and return an owned value; it
/// is read as a source member with the getter's name. Every other method is left alone.
///
/// Any `&self` method without arguments that returns an owned type is taken as a getter, so
/// its return type must implement `Reflect`. Mark methods returning `Result<..>`, tuples or
/// other non-reflected types with `#[copier(skip)]`.
///
/// Per-method attributes: `#[copier(rename = "Name")]` and `#[copier(skip)]`. The block
/// itself accepts `rename_all = "..."` with the same rules as the derive. Generic impl blocks
/// are rejected, as are generic records.
///
/// # Example
///
/// ```ignore
/// #[struct_copier::methods(rename_all = "PascalCase")]
/// impl Employee {
///     fn role(&mut self, role: String) { self.super_rule = format!("Super {role}"); }
///
///     fn full_name(&self) -> String { format!("{} {}", self.first, self.last) }
///
///     #[copier(skip)]
///     fn validate(&self) -> Result<(), String> { Ok(()) }
/// }
/// ```
#[proc_macro_attribute]
pub fn methods(args: TokenStream, item: TokenStream) -> TokenStream {
    methods::methods_impl(args, item)
}
