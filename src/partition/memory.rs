//! In-memory backend
//!
//! Each partition owns an arena of nodes behind the partition's read/write
//! lock. Directories map child names to arena indices; handles address a node
//! by index and hold only a weak reference to the arena, so dropping the
//! partition invalidates every handle derived from it.

use crate::error::{StorageError, StorageResult};
use crate::node::{check_read, check_seek, validate_name, Directory, Node, RegularFile};
use crate::partition::{Partition, PartitionManager};
use crate::types::{DirEntry, NodeKind, PartitionId};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeIndex(usize);

const ROOT: NodeIndex = NodeIndex(0);

/// Per-entry bookkeeping counted towards a directory's size.
const ENTRY_OVERHEAD: u64 = std::mem::size_of::<(String, NodeIndex)>() as u64;

#[derive(Debug)]
enum MemoryNode {
    Regular(Vec<u8>),
    Directory(HashMap<String, NodeIndex>),
}

/// Node storage of one partition; index 0 is the root directory
#[derive(Debug)]
struct Arena {
    nodes: Vec<MemoryNode>,
}

impl Arena {
    fn new() -> Self {
        Self {
            nodes: vec![MemoryNode::Directory(HashMap::new())],
        }
    }

    fn get(&self, index: NodeIndex) -> StorageResult<&MemoryNode> {
        self.nodes.get(index.0).ok_or_else(|| {
            StorageError::Internal(format!("Dangling node index {}", index.0))
        })
    }

    fn entries(&self, index: NodeIndex) -> StorageResult<&HashMap<String, NodeIndex>> {
        match self.get(index)? {
            MemoryNode::Directory(entries) => Ok(entries),
            MemoryNode::Regular(_) => Err(StorageError::Internal(format!(
                "Node {} is not a directory",
                index.0
            ))),
        }
    }

    fn data(&self, index: NodeIndex) -> StorageResult<&[u8]> {
        match self.get(index)? {
            MemoryNode::Regular(data) => Ok(data),
            MemoryNode::Directory(_) => Err(StorageError::Internal(format!(
                "Node {} is not a regular file",
                index.0
            ))),
        }
    }

    fn kind(&self, index: NodeIndex) -> StorageResult<NodeKind> {
        Ok(match self.get(index)? {
            MemoryNode::Regular(_) => NodeKind::Regular,
            MemoryNode::Directory(_) => NodeKind::Directory,
        })
    }

    fn size(&self, index: NodeIndex) -> StorageResult<u64> {
        Ok(match self.get(index)? {
            MemoryNode::Regular(data) => data.len() as u64,
            MemoryNode::Directory(entries) => entries
                .keys()
                .map(|name| name.len() as u64 + ENTRY_OVERHEAD)
                .sum(),
        })
    }

    /// Insert `node` under `parent`. The name collision is detected by the map
    /// insertion itself; on collision the arena is left untouched.
    fn insert_child(
        &mut self,
        parent: NodeIndex,
        name: &str,
        node: MemoryNode,
    ) -> StorageResult<NodeIndex> {
        let index = NodeIndex(self.nodes.len());
        let entries = match self.nodes.get_mut(parent.0) {
            Some(MemoryNode::Directory(entries)) => entries,
            _ => {
                return Err(StorageError::Internal(format!(
                    "Node {} is not a directory",
                    parent.0
                )))
            }
        };
        match entries.entry(name.to_string()) {
            Entry::Occupied(_) => {
                return Err(StorageError::AlreadyExists(format!(
                    "Cannot store '{}': name already taken",
                    name
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
        }
        self.nodes.push(node);
        Ok(index)
    }
}

type SharedArena = Arc<RwLock<Arena>>;

fn upgrade(arena: &Weak<RwLock<Arena>>) -> StorageResult<SharedArena> {
    arena
        .upgrade()
        .ok_or_else(|| StorageError::NotFound("Partition has been destroyed".to_string()))
}

/// Regular file held in memory
#[derive(Debug)]
pub struct MemoryRegularFile {
    arena: Weak<RwLock<Arena>>,
    index: NodeIndex,
    cursor: u64,
}

impl MemoryRegularFile {
    fn new(arena: Weak<RwLock<Arena>>, index: NodeIndex) -> Self {
        Self {
            arena,
            index,
            cursor: 0,
        }
    }
}

impl RegularFile for MemoryRegularFile {
    fn size(&self) -> StorageResult<u64> {
        let arena = upgrade(&self.arena)?;
        let guard = arena.read();
        guard.size(self.index)
    }

    fn cursor(&self) -> u64 {
        self.cursor
    }

    fn seek(&mut self, offset: u64) -> StorageResult<()> {
        check_seek(offset, self.size()?)?;
        self.cursor = offset;
        Ok(())
    }

    fn read(&mut self, nbytes: u64) -> StorageResult<Vec<u8>> {
        let bytes = self.positional_read(self.cursor, nbytes)?;
        self.cursor += bytes.len() as u64;
        Ok(bytes)
    }

    fn positional_read(&self, offset: u64, nbytes: u64) -> StorageResult<Vec<u8>> {
        let arena = upgrade(&self.arena)?;
        let guard = arena.read();
        let data = guard.data(self.index)?;
        check_read(offset, nbytes, data.len() as u64)?;
        let start = offset as usize;
        Ok(data[start..start + nbytes as usize].to_vec())
    }
}

/// Directory held in memory
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    arena: Weak<RwLock<Arena>>,
    index: NodeIndex,
}

impl MemoryDirectory {
    fn handle(&self, index: NodeIndex, kind: NodeKind) -> Node<Self> {
        match kind {
            NodeKind::Directory => Node::Directory(MemoryDirectory {
                arena: self.arena.clone(),
                index,
            }),
            NodeKind::Regular => Node::Regular(MemoryRegularFile::new(self.arena.clone(), index)),
        }
    }
}

impl Directory for MemoryDirectory {
    type File = MemoryRegularFile;

    fn size(&self) -> StorageResult<u64> {
        let arena = upgrade(&self.arena)?;
        let guard = arena.read();
        guard.size(self.index)
    }

    fn store_regular_file(&self, name: &str, data: Vec<u8>) -> StorageResult<MemoryRegularFile> {
        validate_name(name)?;
        let arena = upgrade(&self.arena)?;
        let len = data.len();
        let index = arena
            .write()
            .insert_child(self.index, name, MemoryNode::Regular(data))?;
        debug!(name, bytes = len, "Stored regular file");
        Ok(MemoryRegularFile::new(self.arena.clone(), index))
    }

    fn create_directory(&self, name: &str) -> StorageResult<MemoryDirectory> {
        validate_name(name)?;
        let arena = upgrade(&self.arena)?;
        let index = arena
            .write()
            .insert_child(self.index, name, MemoryNode::Directory(HashMap::new()))?;
        debug!(name, "Created directory");
        Ok(MemoryDirectory {
            arena: self.arena.clone(),
            index,
        })
    }

    fn dir_entries(&self) -> StorageResult<Vec<DirEntry>> {
        let arena = upgrade(&self.arena)?;
        let guard = arena.read();
        let mut entries = guard
            .entries(self.index)?
            .iter()
            .map(|(name, &index)| {
                Ok(DirEntry {
                    name: name.clone(),
                    kind: guard.kind(index)?,
                    size: guard.size(index)?,
                })
            })
            .collect::<StorageResult<Vec<_>>>()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn lookup(&self, name: &str) -> StorageResult<Option<Node<Self>>> {
        let arena = upgrade(&self.arena)?;
        let guard = arena.read();
        match guard.entries(self.index)?.get(name) {
            Some(&index) => Ok(Some(self.handle(index, guard.kind(index)?))),
            None => Ok(None),
        }
    }
}

/// Partition whose tree lives in process memory
#[derive(Debug)]
pub struct MemoryPartition {
    id: PartitionId,
    arena: SharedArena,
}

impl MemoryPartition {
    pub fn new(id: PartitionId) -> Self {
        Self {
            id,
            arena: Arc::new(RwLock::new(Arena::new())),
        }
    }

    /// Number of nodes in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.arena.read().nodes.len()
    }
}

impl Partition for MemoryPartition {
    type Dir = MemoryDirectory;

    fn id(&self) -> PartitionId {
        self.id
    }

    fn open_root(&self) -> MemoryDirectory {
        MemoryDirectory {
            arena: Arc::downgrade(&self.arena),
            index: ROOT,
        }
    }
}

/// Partition manager for the in-memory backend
#[derive(Debug, Default)]
pub struct MemoryPartitionManager {
    partitions: RwLock<HashMap<PartitionId, Arc<MemoryPartition>>>,
}

impl MemoryPartitionManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PartitionManager for MemoryPartitionManager {
    type Partition = MemoryPartition;

    fn contains_partition(&self, id: &PartitionId) -> bool {
        self.partitions.read().contains_key(id)
    }

    fn lookup_partition(&self, id: &PartitionId) -> Option<Arc<MemoryPartition>> {
        self.partitions.read().get(id).cloned()
    }

    fn create_partition(&self, id: &PartitionId) -> StorageResult<Arc<MemoryPartition>> {
        let mut partitions = self.partitions.write();
        match partitions.entry(*id) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists(format!(
                "Partition with id '{}' already exists",
                id
            ))),
            Entry::Vacant(slot) => {
                let partition = Arc::new(MemoryPartition::new(*id));
                slot.insert(partition.clone());
                info!(partition = %id, "Created in-memory partition");
                Ok(partition)
            }
        }
    }

    fn destroy_partition(&self, id: &PartitionId) -> StorageResult<()> {
        if self.partitions.write().remove(id).is_some() {
            info!(partition = %id, "Destroyed in-memory partition");
        }
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut partitions = self.partitions.write();
        let count = partitions.len();
        partitions.clear();
        info!(count, "Cleared in-memory partitions");
        Ok(())
    }

    fn partition_count(&self) -> usize {
        self.partitions.read().len()
    }
}
