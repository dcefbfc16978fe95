//! On-disk backend
//!
//! Mirrors every partition onto a real directory tree under a storage root,
//! one subdirectory per partition id, with no extra metadata files. Handles
//! are rebuilt from the filesystem on every lookup: two opens of the same path
//! give two independent handles over the same file. Reads open the file fresh
//! on each call; no file descriptor is cached.

use crate::concurrency::PartitionLock;
use crate::error::{StorageError, StorageResult};
use crate::node::{check_read, check_seek, validate_name, Directory, Node, RegularFile};
use crate::partition::{Partition, PartitionManager};
use crate::types::{DirEntry, NodeKind, PartitionId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-entry bookkeeping counted towards a directory's size.
const ENTRY_OVERHEAD: u64 = std::mem::size_of::<fs::DirEntry>() as u64;

/// Regular file mirrored by a real file
#[derive(Debug)]
pub struct DiskRegularFile {
    path: PathBuf,
    lock: PartitionLock,
    cursor: u64,
}

impl DiskRegularFile {
    fn new(path: PathBuf, lock: PartitionLock) -> Self {
        Self {
            path,
            lock,
            cursor: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegularFile for DiskRegularFile {
    fn size(&self) -> StorageResult<u64> {
        let _guard = self.lock.read();
        let metadata = fs::metadata(&self.path).map_err(|e| {
            StorageError::from_io(format!("Cannot stat '{}'", self.path.display()), e)
        })?;
        Ok(metadata.len())
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
        let _guard = self.lock.read();
        let io_err = |e| StorageError::from_io(format!("Cannot read '{}'", self.path.display()), e);

        let mut file = fs::File::open(&self.path).map_err(io_err)?;
        let size = file.metadata().map_err(io_err)?.len();
        check_read(offset, nbytes, size)?;

        file.seek(SeekFrom::Start(offset)).map_err(io_err)?;
        let mut buffer = vec![0u8; nbytes as usize];
        file.read_exact(&mut buffer).map_err(|e| {
            StorageError::Internal(format!(
                "Cannot read {} bytes from offset {} from file '{}': {}",
                nbytes,
                offset,
                self.path.display(),
                e
            ))
        })?;
        Ok(buffer)
    }
}

/// Directory mirrored by a real directory
#[derive(Debug, Clone)]
pub struct DiskDirectory {
    path: PathBuf,
    lock: PartitionLock,
}

impl DiskDirectory {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn child(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Metadata footprint of the directory at `path`. Caller holds the lock.
fn footprint(path: &Path) -> StorageResult<u64> {
    let entries = fs::read_dir(path)
        .map_err(|e| StorageError::from_io(format!("Cannot scan '{}'", path.display()), e))?;
    let mut size = 0;
    for entry in entries {
        let entry = entry.map_err(|e| {
            StorageError::from_io(format!("Cannot scan '{}'", path.display()), e)
        })?;
        size += entry.file_name().len() as u64 + ENTRY_OVERHEAD;
    }
    Ok(size)
}

impl Directory for DiskDirectory {
    type File = DiskRegularFile;

    fn size(&self) -> StorageResult<u64> {
        let _guard = self.lock.read();
        footprint(&self.path)
    }

    fn store_regular_file(&self, name: &str, data: Vec<u8>) -> StorageResult<DiskRegularFile> {
        validate_name(name)?;
        let path = self.child(name);
        let _guard = self.lock.write();

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| StorageError::from_io(format!("Cannot store regular file '{}'", name), e))?;
        let written = file.write_all(&data).and_then(|_| file.sync_data());
        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %cleanup, "Failed to remove partial file");
            }
            return Err(StorageError::Internal(format!(
                "Failed to write file '{}': {}",
                name, e
            )));
        }

        debug!(path = %path.display(), bytes = data.len(), "Stored regular file");
        Ok(DiskRegularFile::new(path, self.lock.clone()))
    }

    fn create_directory(&self, name: &str) -> StorageResult<DiskDirectory> {
        validate_name(name)?;
        let path = self.child(name);
        let _guard = self.lock.write();

        fs::create_dir(&path)
            .map_err(|e| StorageError::from_io(format!("Cannot create directory '{}'", name), e))?;

        debug!(path = %path.display(), "Created directory");
        Ok(DiskDirectory {
            path,
            lock: self.lock.clone(),
        })
    }

    fn dir_entries(&self) -> StorageResult<Vec<DirEntry>> {
        let _guard = self.lock.read();
        let scan_err =
            |e| StorageError::from_io(format!("Cannot scan '{}'", self.path.display()), e);

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.path).map_err(scan_err)? {
            let entry = entry.map_err(scan_err)?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!("Skipping non UTF8 entry {:?} in {}", raw, self.path.display());
                    continue;
                }
            };
            let file_type = entry.file_type().map_err(scan_err)?;
            let (kind, size) = if file_type.is_dir() {
                (NodeKind::Directory, footprint(&entry.path())?)
            } else if file_type.is_file() {
                (NodeKind::Regular, entry.metadata().map_err(scan_err)?.len())
            } else {
                warn!("Skipping foreign entry '{}' in {}", name, self.path.display());
                continue;
            };
            entries.push(DirEntry { name, kind, size });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn lookup(&self, name: &str) -> StorageResult<Option<Node<Self>>> {
        let path = self.child(name);
        let _guard = self.lock.read();

        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::from_io(
                    format!("Cannot stat '{}'", path.display()),
                    e,
                ))
            }
        };

        if metadata.is_dir() {
            Ok(Some(Node::Directory(DiskDirectory {
                path,
                lock: self.lock.clone(),
            })))
        } else if metadata.is_file() {
            Ok(Some(Node::Regular(DiskRegularFile::new(
                path,
                self.lock.clone(),
            ))))
        } else {
            Ok(None)
        }
    }
}

/// Partition mirrored by a directory under the storage root
#[derive(Debug)]
pub struct DiskPartition {
    id: PartitionId,
    path: PathBuf,
    lock: PartitionLock,
}

impl DiskPartition {
    /// Wrap an existing partition directory.
    fn attach(id: PartitionId, path: PathBuf) -> Self {
        Self {
            id,
            path,
            lock: PartitionLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Partition for DiskPartition {
    type Dir = DiskDirectory;

    fn id(&self) -> PartitionId {
        self.id
    }

    fn open_root(&self) -> DiskDirectory {
        DiskDirectory {
            path: self.path.clone(),
            lock: self.lock.clone(),
        }
    }
}

/// Partition manager for the on-disk backend
///
/// Partitions persisted by an earlier process are attached on first lookup.
#[derive(Debug)]
pub struct DiskPartitionManager {
    root: PathBuf,
    partitions: RwLock<HashMap<PartitionId, Arc<DiskPartition>>>,
}

impl DiskPartitionManager {
    /// Manager storing partitions under `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            partitions: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_path(&self, id: &PartitionId) -> PathBuf {
        self.root.join(id.to_string())
    }
}

fn remove_tree(path: &Path) -> StorageResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::Internal(format!(
            "Failed to remove '{}': {}",
            path.display(),
            e
        ))),
    }
}

impl PartitionManager for DiskPartitionManager {
    type Partition = DiskPartition;

    fn contains_partition(&self, id: &PartitionId) -> bool {
        self.partitions.read().contains_key(id) || self.partition_path(id).is_dir()
    }

    fn lookup_partition(&self, id: &PartitionId) -> Option<Arc<DiskPartition>> {
        if let Some(partition) = self.partitions.read().get(id) {
            return Some(partition.clone());
        }

        // Destroy removes the directory while holding this guard
        let mut partitions = self.partitions.write();
        if let Some(partition) = partitions.get(id) {
            return Some(partition.clone());
        }
        let path = self.partition_path(id);
        if !path.is_dir() {
            return None;
        }
        debug!(partition = %id, "Attached persisted partition");
        let partition = Arc::new(DiskPartition::attach(*id, path));
        partitions.insert(*id, partition.clone());
        Some(partition)
    }

    fn create_partition(&self, id: &PartitionId) -> StorageResult<Arc<DiskPartition>> {
        let mut partitions = self.partitions.write();
        if partitions.contains_key(id) {
            return Err(StorageError::AlreadyExists(format!(
                "Partition with id '{}' already exists",
                id
            )));
        }

        fs::create_dir_all(&self.root).map_err(|e| {
            StorageError::Internal(format!(
                "Failed to create storage root '{}': {}",
                self.root.display(),
                e
            ))
        })?;
        let path = self.partition_path(id);
        fs::create_dir(&path).map_err(|e| {
            StorageError::from_io(format!("Failed to create partition for UUID '{}'", id), e)
        })?;

        let partition = Arc::new(DiskPartition::attach(*id, path));
        partitions.insert(*id, partition.clone());
        info!(partition = %id, path = %partition.path().display(), "Created on-disk partition");
        Ok(partition)
    }

    fn destroy_partition(&self, id: &PartitionId) -> StorageResult<()> {
        let mut partitions = self.partitions.write();
        partitions.remove(id);
        remove_tree(&self.partition_path(id))?;
        info!(partition = %id, "Destroyed on-disk partition");
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut partitions = self.partitions.write();
        partitions.clear();
        remove_tree(&self.root)?;
        info!(root = %self.root.display(), "Cleared on-disk storage root");
        Ok(())
    }

    /// Counts partition directories present under the root.
    fn partition_count(&self) -> usize {
        let _partitions = self.partitions.read();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };
        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| PartitionId::parse(name).is_ok())
                    .unwrap_or(false)
            })
            .count()
    }
}
