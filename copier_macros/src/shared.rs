//! Parsing of `#[copier(...)]` attributes shared by both macros

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase,
};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Ident, LitStr, Token};

/// Name of the helper attribute
pub const ATTR_NAME: &str = "copier";

const TAG_IGNORE: &str = "-";
const TAG_MUST: &str = "must";
const TAG_RENAME_PREFIX: &str = "rename:";

/// One comma separated item inside `#[copier(...)]`
enum CopierItem {
    /// `ignore`, `must`, `methods`, `skip`
    Flag(Ident),
    /// `rename = "Name"`, `rename_all = "PascalCase"`
    Assign(Ident, LitStr),
    /// `"-"`, `"FieldB"`, `"rename:\"FieldB\",must"`
    Tag(LitStr),
}

impl Parse for CopierItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self::Tag(input.parse()?));
        }
        let key: Ident = input.parse()?;
        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            Ok(Self::Assign(key, input.parse()?))
        } else {
            Ok(Self::Flag(key))
        }
    }
}

/// Every `copier` item across all of `attrs`
fn copier_items(attrs: &[Attribute]) -> syn::Result<Vec<CopierItem>> {
    let mut items = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident(ATTR_NAME)) {
        let parsed =
            attr.parse_args_with(Punctuated::<CopierItem, Token![,]>::parse_terminated)?;
        items.extend(parsed);
    }
    Ok(items)
}

/// Case conversion applied to every member name
#[derive(Clone, Copy)]
pub enum RenameRule {
    PascalCase,
    CamelCase,
    SnakeCase,
    ScreamingSnakeCase,
    KebabCase,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        match lit.value().as_str() {
            "PascalCase" => Ok(Self::PascalCase),
            "camelCase" => Ok(Self::CamelCase),
            "snake_case" => Ok(Self::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnakeCase),
            "kebab-case" => Ok(Self::KebabCase),
            other => Err(syn::Error::new_spanned(
                lit,
                format!(
                    "unknown rename_all rule '{other}', expected one of PascalCase, camelCase, \
                     snake_case, SCREAMING_SNAKE_CASE, kebab-case"
                ),
            )),
        }
    }

    pub fn apply(self, name: &str) -> String {
        match self {
            Self::PascalCase => name.to_upper_camel_case(),
            Self::CamelCase => name.to_lower_camel_case(),
            Self::SnakeCase => name.to_snake_case(),
            Self::ScreamingSnakeCase => name.to_shouty_snake_case(),
            Self::KebabCase => name.to_kebab_case(),
        }
    }
}

/// Attributes on the deriving struct
#[derive(Default)]
pub struct ContainerAttrs {
    pub rename_all: Option<RenameRule>,
    /// Setters and getters come from `#[methods]` on an impl block
    pub methods:    bool,
}

pub fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut parsed = ContainerAttrs::default();
    for item in copier_items(attrs)? {
        match item {
            CopierItem::Assign(key, value) if key == "rename_all" => {
                parsed.rename_all = Some(RenameRule::parse(&value)?);
            }
            CopierItem::Flag(key) if key == "methods" => parsed.methods = true,
            other => return Err(unsupported(&other, "struct")),
        }
    }
    Ok(parsed)
}

/// Attributes on one struct field
#[derive(Default)]
pub struct FieldAttrs {
    pub rename: Option<String>,
    pub ignore: bool,
    pub must:   bool,
}

impl FieldAttrs {
    /// Canonical tag text recorded in the shape (`-`, `rename:"Name"`, `must`)
    pub fn tag(&self, effective_name: Option<&str>) -> String {
        let mut items = Vec::new();
        if self.ignore {
            items.push(TAG_IGNORE.to_owned());
        } else if let Some(name) = effective_name {
            items.push(format!("{TAG_RENAME_PREFIX}\"{name}\""));
        }
        if self.must {
            items.push(TAG_MUST.to_owned());
        }
        items.join(",")
    }
}

pub fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    for item in copier_items(attrs)? {
        match item {
            CopierItem::Flag(key) if key == "ignore" => parsed.ignore = true,
            CopierItem::Flag(key) if key == "must" => parsed.must = true,
            CopierItem::Assign(key, value) if key == "rename" => {
                set_rename(&mut parsed.rename, &value, value.value())?;
            }
            CopierItem::Tag(lit) => parse_tag_text(&lit, &mut parsed)?,
            other => return Err(unsupported(&other, "field")),
        }
    }

    if parsed.ignore && (parsed.must || parsed.rename.is_some()) {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "an ignored field cannot also be renamed or required",
        ));
    }
    Ok(parsed)
}

/// Tag text in the runtime grammar: `-`, `must`, `rename:"Name"` or a bare name
fn parse_tag_text(lit: &LitStr, parsed: &mut FieldAttrs) -> syn::Result<()> {
    let text = lit.value();
    for item in split_tag_items(&text).map(str::trim).filter(|item| !item.is_empty()) {
        if item == TAG_IGNORE {
            parsed.ignore = true;
        } else if item == TAG_MUST {
            parsed.must = true;
        } else if let Some(rest) = item.strip_prefix(TAG_RENAME_PREFIX) {
            let name = rest
                .trim()
                .strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .ok_or_else(|| syn::Error::new_spanned(lit, "rename needs a quoted name"))?;
            set_rename(&mut parsed.rename, lit, name.to_owned())?;
        } else if item
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            set_rename(&mut parsed.rename, lit, item.to_owned())?;
        } else {
            return Err(syn::Error::new_spanned(
                lit,
                format!("unrecognized tag item '{item}'"),
            ));
        }
    }
    Ok(())
}

/// Items of tag text, split on commas outside double quotes
fn split_tag_items(text: &str) -> impl Iterator<Item = &str> {
    let mut quoted = false;
    text.split(move |c: char| {
        if c == '"' {
            quoted = !quoted;
        }
        c == ',' && !quoted
    })
}

fn set_rename(slot: &mut Option<String>, lit: &LitStr, name: String) -> syn::Result<()> {
    if name.is_empty() {
        return Err(syn::Error::new_spanned(lit, "rename to an empty name"));
    }
    if name.contains('"') {
        return Err(syn::Error::new_spanned(lit, "renamed name cannot contain '\"'"));
    }
    if slot.is_some() {
        return Err(syn::Error::new_spanned(lit, "member is renamed more than once"));
    }
    *slot = Some(name);
    Ok(())
}

/// Attributes on a method inside `#[methods]`
#[derive(Default)]
pub struct MethodAttrs {
    pub rename: Option<String>,
    pub skip:   bool,
}

/// Parse and remove the `copier` attributes of a method
pub fn take_method_attrs(attrs: &mut Vec<Attribute>) -> syn::Result<MethodAttrs> {
    let mut parsed = MethodAttrs::default();
    for item in copier_items(attrs)? {
        match item {
            CopierItem::Flag(key) if key == "skip" => parsed.skip = true,
            CopierItem::Assign(key, value) if key == "rename" => {
                set_rename(&mut parsed.rename, &value, value.value())?;
            }
            other => return Err(unsupported(&other, "method")),
        }
    }
    attrs.retain(|attr| !attr.path().is_ident(ATTR_NAME));
    Ok(parsed)
}

/// Arguments of `#[methods(...)]`
pub fn parse_methods_args(args: proc_macro2::TokenStream) -> syn::Result<Option<RenameRule>> {
    if args.is_empty() {
        return Ok(None);
    }
    let items = syn::parse::Parser::parse2(
        Punctuated::<CopierItem, Token![,]>::parse_terminated,
        args,
    )?;
    let mut rename_all = None;
    for item in items {
        match item {
            CopierItem::Assign(key, value) if key == "rename_all" => {
                rename_all = Some(RenameRule::parse(&value)?);
            }
            other => return Err(unsupported(&other, "#[methods]")),
        }
    }
    Ok(rename_all)
}

fn unsupported(item: &CopierItem, location: &str) -> syn::Error {
    match item {
        CopierItem::Flag(key) | CopierItem::Assign(key, _) => {
            syn::Error::new_spanned(key, format!("unsupported copier attribute on {location}"))
        }
        CopierItem::Tag(lit) => {
            syn::Error::new_spanned(lit, format!("tag text is not supported on {location}"))
        }
    }
}
