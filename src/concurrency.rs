//! Partition-level read/write arbitration
//!
//! Every handle of an on-disk partition shares one lock: lookups, listings
//! and reads take it shared, node creation takes it exclusively. The
//! in-memory backend gets the same discipline from the lock around its arena.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared read/write lock for one partition's tree
#[derive(Debug, Clone, Default)]
pub struct PartitionLock {
    inner: Arc<RwLock<()>>,
}

impl PartitionLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared access for readers.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.inner.read()
    }

    /// Exclusive access for writers.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.inner.write()
    }

    /// Whether two handles arbitrate through the same lock.
    pub fn same_partition(&self, other: &PartitionLock) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
