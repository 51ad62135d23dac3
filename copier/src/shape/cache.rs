//! Process-wide cache of record shapes
//!
//! Shapes are built on first use and never rebuilt. Lookups take the read lock; only a miss
//! takes the write lock, and a racing second builder keeps the first shape that landed.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;

use super::RecordShape;
use crate::error::Result;
use crate::reflect::Record;
use crate::type_key::TypeKey;

/// Cache shared by every copy that does not inject its own
static GLOBAL_SHAPE_CACHE: LazyLock<Arc<ShapeCache>> =
    LazyLock::new(|| Arc::new(ShapeCache::new()));

/// Thread-safe memo of `RecordShape`s keyed by type identity
#[derive(Debug, Default)]
pub struct ShapeCache {
    /// Map of record types to their shapes
    shapes: RwLock<HashMap<TypeId, Arc<RecordShape>>>,
}

impl ShapeCache {
    /// Create a new empty cache
    pub fn new() -> Self { Self::default() }

    /// The process-wide cache
    pub fn global() -> Arc<Self> { Arc::clone(&GLOBAL_SHAPE_CACHE) }

    /// Shape of `record`'s type, built on the first call for that type
    ///
    /// # Errors
    ///
    /// Returns a `Shape` error when the record's shape does not validate. Failed shapes are
    /// not cached.
    pub fn describe(&self, record: &dyn Record) -> Result<Arc<RecordShape>> {
        let type_key = record.type_key();

        if let Some(shape) = self.shapes.read().get(&type_key.id()) {
            return Ok(Arc::clone(shape));
        }

        debug!(record_type = %type_key, "Shape cache miss, building shape");
        let shape = Arc::new(record.build_shape()?);

        Ok(Arc::clone(
            self.shapes.write().entry(type_key.id()).or_insert(shape),
        ))
    }

    /// Whether the shape of `type_key` has been built
    pub fn contains(&self, type_key: TypeKey) -> bool {
        self.shapes.read().contains_key(&type_key.id())
    }

    /// Number of cached shapes
    pub fn len(&self) -> usize { self.shapes.read().len() }

    /// Whether no shape has been built yet
    pub fn is_empty(&self) -> bool { self.shapes.read().is_empty() }

    /// Drop every cached shape
    pub fn clear(&self) { self.shapes.write().clear(); }
}
