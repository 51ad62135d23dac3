//! The copy orchestrator
//!
//! [`copy`] and [`copy_with_options`] walk every member of the source (record fields, then
//! record getters, or mapping entries in key order), resolve each against the destination,
//! and hand resolved pairs to the field copier. Per-member failures are collected and
//! returned together as one `Error::Aggregate`; shape errors stop the call immediately.

mod context;
mod field;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use tracing::{debug, trace};

use self::context::{CopyContext, RecursionDepth};
use self::field::{Target, copy_structure, copy_value};
use crate::error::{Error, Result};
use crate::options::CopyOptions;
use crate::reflect::{Mapping, Record, Reflect, ReflectMut, ReflectRef, Sequence};
use crate::resolver::{Resolution, resolve};
use crate::type_key::TypeKind;

/// Copy `source` into `destination` with default options
///
/// No converters, the default recursion limit and the global shape cache.
///
/// # Errors
///
/// Returns `Error::Shape` when either side cannot take part in a copy, and
/// `Error::Aggregate` listing every member that failed to copy.
pub fn copy(destination: &mut dyn Reflect, source: &dyn Reflect) -> Result<()> {
    copy_with_options(destination, source, &CopyOptions::default())
}

/// Copy `source` into `destination`
///
/// The destination must be a record, a mapping or a sequence. Records and mappings accept
/// record or mapping sources; sequences accept sequence sources.
///
/// # Errors
///
/// Returns `Error::Shape` before touching the destination when the kinds cannot be copied,
/// or as soon as a record shape fails to validate. Every other failure is collected and
/// returned at the end as `Error::Aggregate`, after all other members have been copied.
pub fn copy_with_options(
    destination: &mut dyn Reflect,
    source: &dyn Reflect,
    options: &CopyOptions,
) -> Result<()> {
    let (destination_kind, source_kind) = (destination.kind(), source.kind());
    debug!(
        destination_type = %destination.type_key(),
        source_type = %source.type_key(),
        "Copying"
    );

    let compatible = match destination_kind {
        TypeKind::Mapping | TypeKind::Record => source_kind.is_structured(),
        TypeKind::Sequence => source_kind == TypeKind::Sequence,
        TypeKind::Optional | TypeKind::Value => {
            return Err(Error::cannot(
                "copy",
                format!(
                    "destination {} is not a record, mapping or sequence",
                    destination.type_key()
                ),
            )
            .into());
        }
    };
    if !compatible {
        return Err(Error::cannot(
            "copy",
            format!("a {source_kind} source does not fit a {destination_kind} destination"),
        )
        .into());
    }

    let mut ctx = CopyContext::new(options);
    copy_into(destination, source, &mut ctx, RecursionDepth::ZERO)?;
    ctx.finish()
}

/// Copy into a structured or sequence destination at `depth`
fn copy_into(
    destination: &mut dyn Reflect,
    source: &dyn Reflect,
    ctx: &mut CopyContext<'_>,
    depth: RecursionDepth,
) -> Result<()> {
    let destination_type = destination.type_key();
    match (destination.reflect_mut(), source.reflect_ref()) {
        (ReflectMut::Record(record), _) => copy_into_record(record, source, ctx, depth),
        (ReflectMut::Mapping(mapping), _) => copy_into_mapping(mapping, source, ctx, depth),
        (ReflectMut::Sequence(sequence), ReflectRef::Sequence(elements)) => {
            copy_sequence(sequence, elements, ctx, depth)
        }
        _ => Err(Error::cannot(
            "copy",
            format!("{} into {destination_type}", source.type_key()),
        )
        .into()),
    }
}

/// A source member's value, borrowed from a field or entry, or returned by a getter
enum MemberValue<'a> {
    Borrowed(&'a dyn Reflect),
    Owned(Box<dyn Reflect>),
}

impl MemberValue<'_> {
    fn as_reflect(&self) -> &dyn Reflect {
        match self {
            Self::Borrowed(value) => *value,
            Self::Owned(value) => &**value,
        }
    }
}

struct SourceMember<'a> {
    name:  String,
    value: MemberValue<'a>,
}

/// Named members of a record or mapping source
fn source_members<'a>(
    source: &'a dyn Reflect,
    ctx: &CopyContext<'_>,
) -> Result<Vec<SourceMember<'a>>> {
    match source.reflect_ref() {
        ReflectRef::Record(record) => {
            let shape = ctx.describe(record)?;
            let fields = shape
                .members()
                .iter()
                .filter(|member| !member.is_ignored())
                .filter_map(|member| {
                    record.field(member.index).map(|value| SourceMember {
                        name:  member.effective_name.clone(),
                        value: MemberValue::Borrowed(value),
                    })
                });
            let getters = shape.getters().iter().enumerate().filter_map(|(index, getter)| {
                record.call_getter(index).map(|value| SourceMember {
                    name:  getter.name.clone(),
                    value: MemberValue::Owned(value),
                })
            });
            Ok(fields.chain(getters).collect())
        }
        ReflectRef::Mapping(mapping) => {
            let mut entries = mapping.entries();
            entries.sort_unstable_by(|(left, _), (right, _)| left.cmp(right));
            Ok(entries
                .into_iter()
                .map(|(key, value)| SourceMember {
                    name:  key.to_owned(),
                    value: MemberValue::Borrowed(value),
                })
                .collect())
        }
        other => Err(Error::cannot(
            "read members",
            format!("a {} source has no named members", other.kind()),
        )
        .into()),
    }
}

fn skip_empty(value: &dyn Reflect, ctx: &CopyContext<'_>, name: &str) -> bool {
    let skip = ctx.settings().ignore_empty && value.is_empty_value();
    if skip {
        debug!(path = %ctx.path(), member = name, "Skipping empty source member");
    }
    skip
}

fn copy_into_record(
    destination: &mut dyn Record,
    source: &dyn Reflect,
    ctx: &mut CopyContext<'_>,
    depth: RecursionDepth,
) -> Result<()> {
    let shape = ctx.describe(&*destination)?;
    let members = source_members(source, ctx)?;
    let mut attempted = HashSet::new();
    let mut populated = HashSet::new();

    for member in &members {
        let (name, value) = (member.name.as_str(), member.value.as_reflect());

        let resolution = resolve(name, &shape);
        if resolution == Resolution::Unmatched {
            debug!(path = %ctx.path(), member = name, "No destination member, skipping");
            continue;
        }
        if skip_empty(value, ctx, name) {
            continue;
        }
        if !attempted.insert(resolution) {
            debug!(path = %ctx.path(), member = name, "Destination member already written, skipping");
            continue;
        }

        let mark = ctx.enter_member(name);
        trace!(path = %ctx.path(), target = ?resolution, "Copying member");
        let written = match resolution {
            Resolution::Field(index) => {
                let Some(slot) = destination.field_mut(index) else {
                    return Err(Error::cannot(
                        &format!("write {}", shape.type_key()),
                        format!("no field at index {index} for '{name}'"),
                    )
                    .into());
                };
                copy_value(Target::Field(slot), value, ctx, depth)?
            }
            Resolution::Method(index) => {
                let Some(setter) = shape.setters().get(index) else {
                    return Err(Error::cannot(
                        &format!("call setter on {}", shape.type_key()),
                        format!("no setter at index {index} for '{name}'"),
                    )
                    .into());
                };
                let target = Target::Method {
                    record: &mut *destination,
                    index,
                    parameter: setter.type_key,
                };
                copy_value(target, value, ctx, depth)?
            }
            Resolution::Unmatched => false,
        };
        if written && let Resolution::Field(index) = resolution {
            populated.insert(index);
        }
        ctx.leave(mark);
    }

    for member in shape.required_members() {
        if !populated.contains(&member.index) {
            let mark = ctx.enter_member(&member.effective_name);
            ctx.missing_required();
            ctx.leave(mark);
        }
    }
    Ok(())
}

fn copy_into_mapping(
    destination: &mut dyn Mapping,
    source: &dyn Reflect,
    ctx: &mut CopyContext<'_>,
    depth: RecursionDepth,
) -> Result<()> {
    let members = source_members(source, ctx)?;
    let typed = destination.value_type().is_some();
    let mut attempted = HashSet::new();

    for member in &members {
        let (name, value) = (member.name.as_str(), member.value.as_reflect());
        if skip_empty(value, ctx, name) {
            continue;
        }
        if !attempted.insert(name) {
            debug!(path = %ctx.path(), member = name, "Entry already written, skipping");
            continue;
        }

        let mark = ctx.enter_member(name);
        trace!(path = %ctx.path(), "Copying entry");
        if typed {
            let existed = destination.contains_key(name);
            let written = match destination.slot(name) {
                Some(slot) => copy_value(Target::Field(slot), value, ctx, depth)?,
                None => false,
            };
            if !written && !existed {
                destination.remove(name);
            }
        } else {
            copy_dynamic_entry(destination, name, value, ctx, depth)?;
        }
        ctx.leave(mark);
    }
    Ok(())
}

/// Store one entry in a mapping that accepts any value type
///
/// Structured values merge into an existing structured entry; everything else replaces it.
fn copy_dynamic_entry(
    destination: &mut dyn Mapping,
    key: &str,
    value: &dyn Reflect,
    ctx: &mut CopyContext<'_>,
    depth: RecursionDepth,
) -> Result<()> {
    let value = match value.reflect_ref() {
        ReflectRef::Optional(None) => return Ok(()),
        ReflectRef::Optional(Some(inner)) => inner,
        _ => value,
    };

    if let Some(slot) = destination.slot(key)
        && slot.kind().is_structured()
        && value.kind().is_structured()
    {
        copy_structure(slot, value, ctx, depth)?;
        return Ok(());
    }

    destination.insert_value(key, value);
    Ok(())
}

/// Copy element-wise, resizing `destination` to the source length
///
/// Sequences without a declared element type take copies of the source elements as they are.
fn copy_sequence(
    destination: &mut dyn Sequence,
    source: &dyn Sequence,
    ctx: &mut CopyContext<'_>,
    depth: RecursionDepth,
) -> Result<()> {
    if destination.element_type().is_none() {
        destination.truncate(0);
        for index in 0..source.len() {
            if let Some(element) = source.get(index) {
                destination.push_value(element);
            }
        }
        return Ok(());
    }

    destination.truncate(source.len());
    for index in 0..source.len() {
        let Some(element) = source.get(index) else {
            continue;
        };
        let mark = ctx.enter_index(index);
        if index >= destination.len() && !destination.push_default() {
            ctx.mismatch(element.type_key(), destination.type_key());
        } else if let Some(slot) = destination.get_mut(index) {
            copy_value(Target::Field(slot), element, ctx, depth)?;
        }
        ctx.leave(mark);
    }
    Ok(())
}
