//! Partitions and partition managers
//!
//! A partition owns one node tree and resolves hierarchical paths against it.
//! A partition manager owns the partitions of one backend, keyed by
//! [`PartitionId`]. Path resolution is shared by both backends and only relies
//! on [`Directory::lookup`], so traversal behaves identically on each.

pub mod disk;
pub mod memory;

pub use disk::{DiskDirectory, DiskPartition, DiskPartitionManager, DiskRegularFile};
pub use memory::{MemoryDirectory, MemoryPartition, MemoryPartitionManager, MemoryRegularFile};

use crate::error::{StorageError, StorageResult};
use crate::node::{Directory, Node};
use crate::types::PartitionId;
use std::fmt;
use std::path::{Component, Path};
use std::sync::Arc;

/// One isolated namespace with a single root directory
pub trait Partition: fmt::Debug + Send + Sync {
    type Dir: Directory;

    fn id(&self) -> PartitionId;

    /// The root directory. Never fails.
    fn open_root(&self) -> Self::Dir;

    /// Open a node by absolute path.
    fn open<P: AsRef<Path>>(&self, path: P) -> StorageResult<Node<Self::Dir>> {
        let path = path.as_ref();
        if !path.has_root() {
            return Err(StorageError::NotFound(format!(
                "Expected absolute path, but received '{}'",
                path.display()
            )));
        }
        resolve(&self.open_root(), path)
    }

    /// Open a node relative to `base`. An empty path yields `base` itself.
    fn open_from<P: AsRef<Path>>(
        &self,
        base: &Self::Dir,
        path: P,
    ) -> StorageResult<Node<Self::Dir>> {
        resolve(base, path.as_ref())
    }

    fn open_dir<P: AsRef<Path>>(&self, path: P) -> StorageResult<Self::Dir> {
        let path = path.as_ref();
        self.open(path)?.into_directory(&display_name(path))
    }

    fn open_regular_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> StorageResult<<Self::Dir as Directory>::File> {
        let path = path.as_ref();
        self.open(path)?.into_regular_file(&display_name(path))
    }
}

/// Owner of all partitions of one backend
///
/// Lookups may run concurrently; creation, destruction and clearing are
/// exclusive.
pub trait PartitionManager: Send + Sync {
    type Partition: Partition;

    fn contains_partition(&self, id: &PartitionId) -> bool;

    /// `None` is a regular outcome at this layer.
    fn lookup_partition(&self, id: &PartitionId) -> Option<Arc<Self::Partition>>;

    /// Create a partition. Callers are expected to check for absence first;
    /// a duplicate fails `AlreadyExists` and leaves the existing partition alone.
    fn create_partition(&self, id: &PartitionId) -> StorageResult<Arc<Self::Partition>>;

    /// Remove a partition and release its storage. No-op if absent.
    fn destroy_partition(&self, id: &PartitionId) -> StorageResult<()>;

    /// Remove every partition.
    fn clear(&self) -> StorageResult<()>;

    fn partition_count(&self) -> usize;
}

/// Walk `path` component by component starting at `base`.
pub fn resolve<D: Directory>(base: &D, path: &Path) -> StorageResult<Node<D>> {
    let not_found = || StorageError::NotFound(format!("File '{}' not found", path.display()));

    let mut names = Vec::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::Normal(name) => names.push(name.to_str().ok_or_else(not_found)?),
            Component::ParentDir | Component::Prefix(_) => return Err(not_found()),
        }
    }

    let Some((last, parents)) = names.split_last() else {
        return Ok(Node::Directory(base.clone()));
    };

    let mut current = base.clone();
    for name in parents {
        current = match current.lookup(name)? {
            Some(Node::Directory(dir)) => dir,
            Some(Node::Regular(_)) => {
                return Err(StorageError::Directory(format!(
                    "Expected directory, but received regular file '{}'",
                    name
                )))
            }
            None => return Err(not_found()),
        };
    }

    current.lookup(last)?.ok_or_else(not_found)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
