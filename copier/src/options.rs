//! Per-call copy configuration
//!
//! [`CopyOptions`] carries everything one copy call needs: the converter registry, the
//! behaviour flags, the recursion limit and the shape cache. The scalar knobs also exist as
//! the serde-friendly [`CopySettings`] so applications can load them from a config file.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX_DEPTH;
use crate::converter::{Converter, ConverterRegistry};
use crate::shape::ShapeCache;

/// Scalar copy settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopySettings {
    /// Skip source members holding their type's zero value
    pub ignore_empty: bool,
    /// Copy identical structured types member by member instead of cloning them whole
    pub deep_copy:    bool,
    /// Deepest nesting level that is still copied; the top level is depth 0
    pub max_depth:    usize,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            ignore_empty: false,
            deep_copy:    false,
            max_depth:    DEFAULT_MAX_DEPTH,
        }
    }
}

/// Options for [`copy_with_options`](crate::copy_with_options)
#[derive(Debug, Clone, Default)]
pub struct CopyOptions {
    /// Converters consulted when types differ
    pub converters:  ConverterRegistry,
    /// Behaviour flags and recursion limit
    pub settings:    CopySettings,
    /// Cache to describe records with, the global cache when `None`
    pub shape_cache: Option<Arc<ShapeCache>>,
}

impl CopyOptions {
    /// Default options: no converters, global cache, default depth
    pub fn new() -> Self { Self::default() }

    /// Options using `settings` for the scalar knobs
    pub fn from_settings(settings: CopySettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Register one converter
    #[must_use]
    pub fn with_converter(mut self, converter: Converter) -> Self {
        self.converters.register(converter);
        self
    }

    /// Register several converters in order
    #[must_use]
    pub fn with_converters(mut self, converters: impl IntoIterator<Item = Converter>) -> Self {
        self.converters.extend(converters);
        self
    }

    /// Skip zero-valued source members
    #[must_use]
    pub const fn ignore_empty(mut self, ignore_empty: bool) -> Self {
        self.settings.ignore_empty = ignore_empty;
        self
    }

    /// Force the member-by-member path for identical structured types
    #[must_use]
    pub const fn deep_copy(mut self, deep_copy: bool) -> Self {
        self.settings.deep_copy = deep_copy;
        self
    }

    /// Override the recursion limit
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.settings.max_depth = max_depth;
        self
    }

    /// Describe records with `cache` instead of the global one
    #[must_use]
    pub fn with_shape_cache(mut self, cache: Arc<ShapeCache>) -> Self {
        self.shape_cache = Some(cache);
        self
    }

    /// Cache this call describes records with
    pub fn shape_cache(&self) -> Arc<ShapeCache> {
        self.shape_cache
            .as_ref()
            .map_or_else(ShapeCache::global, Arc::clone)
    }
}
