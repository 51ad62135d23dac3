//! Matching source member names to destination members
//!
//! Matching is exact and case sensitive. A non-ignored field whose effective name equals the
//! source name wins; otherwise a setter with that name; otherwise the source member is
//! skipped without error.

use crate::shape::RecordShape;

/// Destination member selected for one source name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Member at this declaration index
    Field(usize),
    /// Setter at this index in the shape's setter list
    Method(usize),
    /// Nothing on the destination matches
    Unmatched,
}

impl Resolution {
    /// Whether a destination member was found
    pub const fn is_matched(&self) -> bool { !matches!(self, Self::Unmatched) }
}

/// Resolve `source_name` against `destination`
pub fn resolve(source_name: &str, destination: &RecordShape) -> Resolution {
    if let Some(index) = destination.field_by_name(source_name) {
        return Resolution::Field(index);
    }
    destination
        .setter_by_name(source_name)
        .map_or(Resolution::Unmatched, Resolution::Method)
}
