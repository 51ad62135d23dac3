//! Per-member tag directives
//!
//! Tags are comma separated items; commas inside a quoted name do not separate:
//!
//! - `-` ignores the member entirely
//! - `rename:"NewName"` matches the member under `NewName`
//! - a bare name (`FieldB`) is shorthand for `rename:"FieldB"`
//! - `must` requires the destination member to be populated
//!
//! An empty tag is the `Default` directive.

use thiserror::Error;

use crate::constants::{TAG_IGNORE, TAG_MUST, TAG_RENAME_PREFIX, TAG_SEPARATOR};

/// Malformed tag text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TagError(String);

/// How a member's name participates in matching
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagDirective {
    /// Match under the declared name
    #[default]
    Default,
    /// Never read from nor written to
    Ignore,
    /// Match under the given name instead of the declared one
    Rename(String),
}

/// Everything a member's tag text says about it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberTag {
    /// Naming directive
    pub directive: TagDirective,
    /// Destination must be populated by some source member
    pub required:  bool,
}

impl MemberTag {
    /// Parse tag text
    ///
    /// # Errors
    ///
    /// Returns a `TagError` for malformed renames, repeated directives, or `-` combined
    /// with any other item.
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let mut parsed = Self::default();

        for item in split_items(tag).map(str::trim).filter(|item| !item.is_empty()) {
            if item == TAG_MUST {
                parsed.required = true;
                continue;
            }

            let directive = if item == TAG_IGNORE {
                TagDirective::Ignore
            } else if let Some(rest) = item.strip_prefix(TAG_RENAME_PREFIX) {
                TagDirective::Rename(parse_quoted_name(rest, tag)?)
            } else if is_bare_name(item) {
                TagDirective::Rename(item.to_owned())
            } else {
                return Err(TagError(format!("unrecognized item '{item}' in '{tag}'")));
            };

            if parsed.directive != TagDirective::Default {
                return Err(TagError(format!("more than one directive in '{tag}'")));
            }
            parsed.directive = directive;
        }

        if parsed.directive == TagDirective::Ignore && parsed.required {
            return Err(TagError(format!(
                "'{TAG_IGNORE}' cannot be combined with '{TAG_MUST}' in '{tag}'"
            )));
        }

        Ok(parsed)
    }
}

/// Items of `tag`, split on separators outside double quotes
fn split_items(tag: &str) -> impl Iterator<Item = &str> {
    let mut quoted = false;
    tag.split(move |c: char| {
        if c == '"' {
            quoted = !quoted;
        }
        c == TAG_SEPARATOR && !quoted
    })
}

fn parse_quoted_name(rest: &str, tag: &str) -> Result<String, TagError> {
    let name = rest
        .trim()
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .ok_or_else(|| TagError(format!("rename needs a quoted name in '{tag}'")))?;

    if name.is_empty() {
        return Err(TagError(format!("rename to an empty name in '{tag}'")));
    }
    if name.contains('"') {
        return Err(TagError(format!("quote inside a renamed name in '{tag}'")));
    }
    Ok(name.to_owned())
}

fn is_bare_name(item: &str) -> bool {
    item.chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}
