//! Transfer of one source value into one resolved destination member
//!
//! A destination member is either a field slot or a setter method; both sit behind
//! [`Target`] so the decision order below treats them alike:
//!
//! 1. `None` sources are absent and skipped, `Some` sources are unwrapped unless the target is the
//!    same `Option` type
//! 2. identical types are assigned whole (unless `deep_copy` asks for the recursive path)
//! 3. structured into structured recurses; sequence into sequence copies element-wise
//! 4. a converter for the exact `(source, target)` pair converts then assigns; for setters the
//!    target type is the parameter type
//! 5. `Option<T>` fields accept a `T`, directly or through a converter into `T`
//! 6. anything else is a type mismatch

use tracing::{trace, warn};

use super::context::{CopyContext, RecursionDepth};
use super::{copy_into, copy_sequence};
use crate::error::Result;
use crate::reflect::{Record, Reflect, ReflectMut, ReflectRef};
use crate::type_key::{TypeKey, TypeKind};

/// A destination member that can receive a value
pub(crate) enum Target<'a> {
    /// Field slot on a record, entry slot in a mapping, or element slot in a sequence
    Field(&'a mut dyn Reflect),
    /// Setter `index` on `record`, taking a `parameter`
    Method {
        record:    &'a mut dyn Record,
        index:     usize,
        parameter: TypeKey,
    },
}

impl Target<'_> {
    /// Type a value must have to be assigned without conversion
    fn type_key(&self) -> TypeKey {
        match self {
            Self::Field(slot) => slot.type_key(),
            Self::Method { parameter, .. } => *parameter,
        }
    }

    fn accepts_type(&self, type_key: TypeKey) -> bool { self.type_key() == type_key }

    /// Write `value`, `false` when its type is not accepted
    fn assign(&mut self, value: &dyn Reflect) -> bool {
        match self {
            Self::Field(slot) => slot.assign(value),
            Self::Method { record, index, .. } => record.call_setter(*index, value),
        }
    }

    const fn is_method(&self) -> bool { matches!(self, Self::Method { .. }) }
}

/// Copy `value` into `target`
///
/// Per-member failures are recorded on `ctx`. Returns whether the target was written; only
/// fatal shape errors come back as `Err`.
pub(crate) fn copy_value(
    mut target: Target<'_>,
    value: &dyn Reflect,
    ctx: &mut CopyContext<'_>,
    depth: RecursionDepth,
) -> Result<bool> {
    let source_type = value.type_key();

    if let ReflectRef::Optional(inner) = value.reflect_ref() {
        if !target.accepts_type(source_type) {
            return match inner {
                Some(inner) => copy_value(target, inner, ctx, depth),
                None => {
                    trace!(path = %ctx.path(), "Source is None, leaving destination untouched");
                    Ok(false)
                }
            };
        }
        if inner.is_none() {
            trace!(path = %ctx.path(), "Source is None, leaving destination untouched");
            return Ok(false);
        }
    }

    let structured = value.kind().is_structured() || value.kind() == TypeKind::Sequence;
    let force_recursion = ctx.settings().deep_copy && structured && !target.is_method();
    if target.accepts_type(source_type) && !force_recursion && target.assign(value) {
        return Ok(true);
    }

    if let Target::Field(slot) = &mut target
        && let Some(written) = copy_structure(&mut **slot, value, ctx, depth)?
    {
        return Ok(written);
    }

    let target_type = target.type_key();
    if let Some(converter) = ctx.converters().lookup(source_type, target_type) {
        return Ok(match converter.convert(value) {
            Ok(converted) if target.assign(&*converted) => true,
            Ok(converted) => {
                ctx.mismatch(converted.type_key(), target_type);
                false
            }
            Err(failure) => {
                warn!(path = %ctx.path(), error = %failure, "Converter failed");
                ctx.conversion_failed(source_type, target_type, failure);
                false
            }
        });
    }

    if let Target::Field(slot) = &mut target
        && let ReflectMut::Optional(optional) = slot.reflect_mut()
    {
        let inner_type = optional.inner_type();
        if inner_type == source_type && optional.assign_some(value) {
            return Ok(true);
        }
        if let Some(converter) = ctx.converters().lookup(source_type, inner_type) {
            return Ok(match converter.convert(value) {
                Ok(converted) => optional.assign_some(&*converted),
                Err(failure) => {
                    warn!(path = %ctx.path(), error = %failure, "Converter failed");
                    ctx.conversion_failed(source_type, inner_type, failure);
                    false
                }
            });
        }
    }

    trace!(
        path = %ctx.path(),
        source_type = %source_type,
        target_type = %target_type,
        "No assignment path"
    );
    ctx.mismatch(source_type, target_type);
    Ok(false)
}

/// Recurse for structured-into-structured and sequence-into-sequence pairs
///
/// Returns `None` when the pair is neither, leaving the decision to the remaining steps, and
/// otherwise whether the nested copy finished without recording a failure.
pub(crate) fn copy_structure(
    slot: &mut dyn Reflect,
    value: &dyn Reflect,
    ctx: &mut CopyContext<'_>,
    depth: RecursionDepth,
) -> Result<Option<bool>> {
    let (source_kind, slot_kind) = (value.kind(), slot.kind());

    if source_kind.is_structured() && slot_kind.is_structured() {
        let nested = depth.increment();
        if nested.exceeds_limit(ctx.settings().max_depth) {
            warn!(
                path = %ctx.path(),
                limit = ctx.settings().max_depth,
                "Recursion limit reached, skipping branch"
            );
            ctx.recursion_limit();
            return Ok(Some(false));
        }
        let failures = ctx.error_count();
        copy_into(slot, value, ctx, nested)?;
        return Ok(Some(ctx.error_count() == failures));
    }

    if let (ReflectMut::Sequence(destination), ReflectRef::Sequence(source)) =
        (slot.reflect_mut(), value.reflect_ref())
    {
        let failures = ctx.error_count();
        copy_sequence(destination, source, ctx, depth)?;
        return Ok(Some(ctx.error_count() == failures));
    }

    Ok(None)
}
