//! Per-call state for one copy invocation
//!
//! The context owns the accumulated per-member errors and the member path of whatever is
//! being copied right now. Nesting depth travels separately as a `RecursionDepth` argument
//! so that each branch carries its own.

use std::sync::Arc;

use error_stack::Report;

use crate::constants::ROOT_PATH;
use crate::converter::ConverterRegistry;
use crate::error::{BoxError, Error, Result};
use crate::options::{CopyOptions, CopySettings};
use crate::reflect::Record;
use crate::shape::{RecordShape, ShapeCache};
use crate::type_key::TypeKey;

/// Nesting level of the record or mapping being copied, the top level is `ZERO`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct RecursionDepth(usize);

impl RecursionDepth {
    pub(crate) const ZERO: Self = Self(0);

    /// Depth of a nested level
    pub(crate) const fn increment(self) -> Self { Self(self.0.saturating_add(1)) }

    /// Whether this depth is deeper than `limit`
    pub(crate) const fn exceeds_limit(self, limit: usize) -> bool { self.0 > limit }
}

/// Errors, path and collaborators of one copy call
pub(crate) struct CopyContext<'a> {
    options: &'a CopyOptions,
    shapes:  Arc<ShapeCache>,
    errors:  Vec<Error>,
    path:    String,
}

impl<'a> CopyContext<'a> {
    pub(crate) fn new(options: &'a CopyOptions) -> Self {
        Self {
            options,
            shapes: options.shape_cache(),
            errors: Vec::new(),
            path: String::new(),
        }
    }

    pub(crate) const fn settings(&self) -> &'a CopySettings { &self.options.settings }

    pub(crate) const fn converters(&self) -> &'a ConverterRegistry { &self.options.converters }

    /// Cached shape of `record`'s type
    pub(crate) fn describe(&self, record: &dyn Record) -> Result<Arc<RecordShape>> {
        self.shapes.describe(record)
    }

    /// Member path of the value being copied
    pub(crate) fn path(&self) -> &str {
        if self.path.is_empty() {
            ROOT_PATH
        } else {
            &self.path
        }
    }

    /// Descend into a named member, returning the mark to `leave` with
    pub(crate) fn enter_member(&mut self, name: &str) -> usize {
        let mark = self.path.len();
        self.path.push('.');
        self.path.push_str(name);
        mark
    }

    /// Descend into a sequence element, returning the mark to `leave` with
    pub(crate) fn enter_index(&mut self, index: usize) -> usize {
        let mark = self.path.len();
        self.path.push_str(&format!("[{index}]"));
        mark
    }

    pub(crate) fn leave(&mut self, mark: usize) { self.path.truncate(mark); }

    /// Number of failures recorded so far
    pub(crate) const fn error_count(&self) -> usize { self.errors.len() }

    pub(crate) fn mismatch(&mut self, source: TypeKey, destination: TypeKey) {
        let error = Error::mismatch(self.path(), source.name(), destination.name());
        self.errors.push(error);
    }

    pub(crate) fn conversion_failed(
        &mut self,
        source: TypeKey,
        destination: TypeKey,
        failure: BoxError,
    ) {
        let error = Error::conversion(self.path(), source.name(), destination.name(), failure);
        self.errors.push(error);
    }

    pub(crate) fn recursion_limit(&mut self) {
        let error = Error::recursion_limit(self.path(), self.settings().max_depth);
        self.errors.push(error);
    }

    pub(crate) fn missing_required(&mut self) {
        let error = Error::missing_required(self.path());
        self.errors.push(error);
    }

    /// Fold the collected failures into the call's result
    pub(crate) fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Report::new(Error::Aggregate(self.errors)))
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, reason = "tests fail loudly on unexpected errors")]
mod tests {
    use super::*;

    #[test]
    fn path_segments_nest_and_unwind() {
        let options = CopyOptions::new();
        let mut ctx = CopyContext::new(&options);
        assert_eq!(ctx.path(), ROOT_PATH);

        let outer = ctx.enter_member("nested");
        let inner = ctx.enter_index(2);
        assert_eq!(ctx.path(), ".nested[2]");

        ctx.leave(inner);
        assert_eq!(ctx.path(), ".nested");
        ctx.leave(outer);
        assert_eq!(ctx.path(), ROOT_PATH);
    }

    #[test]
    fn depth_limit_allows_the_limit_itself() {
        let nested = RecursionDepth::ZERO.increment();
        assert!(!nested.exceeds_limit(1));
        assert!(nested.increment().exceeds_limit(1));
    }

    #[test]
    fn errors_are_aggregated_at_the_end() {
        let options = CopyOptions::new();
        let mut ctx = CopyContext::new(&options);
        let mark = ctx.enter_member("id");
        ctx.missing_required();
        ctx.leave(mark);
        ctx.mismatch(TypeKey::of::<String>(), TypeKey::of::<i64>());
        assert_eq!(ctx.error_count(), 2);

        let report = ctx.finish().expect_err("two failures were recorded");
        let errors = report.current_context().members();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path(), Some(".id"));
        assert_eq!(errors[1].path(), Some(ROOT_PATH));
    }
}
