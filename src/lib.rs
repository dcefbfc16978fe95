//! Partfs: Partitioned Hierarchical Storage
//!
//! A namespace of directories and regular files isolated into partitions
//! addressed by UUID, backed interchangeably by an in-process tree or a mirror
//! onto a real directory tree.
//!
//! Request handlers go through [`storage::Storage`], which validates partition
//! ids and serializes partition creation, then resolve paths on a
//! [`partition::Partition`] and operate on the returned
//! [`node::Directory`] / [`node::RegularFile`] handles.

pub mod concurrency;
pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod partition;
pub mod session;
pub mod storage;
pub mod tooling;
pub mod types;

pub use error::{ApiError, ErrorKind, StorageError, StorageResult};
pub use node::{Directory, Node, ReadRange, RegularFile};
pub use partition::{
    DiskPartitionManager, MemoryPartitionManager, Partition, PartitionManager,
};
pub use storage::{PartitionHandle, Storage};
pub use types::{DirEntry, NodeKind, PartitionId};
