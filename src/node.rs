//! Node contracts
//!
//! Regular files and directories as seen by callers of a partition. Each backend
//! provides exactly one implementation of [`RegularFile`] and [`Directory`]; the
//! handles are owned values that address a node inside the partition rather than
//! references borrowed from the tree.

use crate::error::{StorageError, StorageResult};
use crate::types::{DirEntry, NodeKind};
use std::fmt;

/// Regular file handle
///
/// Content is immutable once stored. Every handle carries its own sequential
/// read cursor, starting at offset 0.
pub trait RegularFile: fmt::Debug + Send + Sync {
    /// Exact stored byte length.
    fn size(&self) -> StorageResult<u64>;

    fn kind(&self) -> NodeKind {
        NodeKind::Regular
    }

    /// Current sequential read cursor.
    fn cursor(&self) -> u64;

    /// Move the cursor; `offset` must be strictly less than the file size.
    fn seek(&mut self, offset: u64) -> StorageResult<()>;

    /// Read `nbytes` from the cursor and advance it.
    fn read(&mut self, nbytes: u64) -> StorageResult<Vec<u8>>;

    /// Stateless absolute read. Never touches the cursor.
    fn positional_read(&self, offset: u64, nbytes: u64) -> StorageResult<Vec<u8>>;
}

/// Directory handle
pub trait Directory: fmt::Debug + Clone + Send + Sync + Sized {
    type File: RegularFile;

    /// Metadata footprint of the entries, not the recursive content size.
    fn size(&self) -> StorageResult<u64>;

    fn kind(&self) -> NodeKind {
        NodeKind::Directory
    }

    /// Store a new regular file; fails `AlreadyExists` if `name` is taken.
    fn store_regular_file(&self, name: &str, data: Vec<u8>) -> StorageResult<Self::File>;

    /// Create an empty subdirectory; fails `AlreadyExists` if `name` is taken.
    fn create_directory(&self, name: &str) -> StorageResult<Self>;

    /// Snapshot of the children, sorted by name.
    fn dir_entries(&self) -> StorageResult<Vec<DirEntry>>;

    /// Find the child called `name`, if any.
    fn lookup(&self, name: &str) -> StorageResult<Option<Node<Self>>>;
}

/// A resolved node: either kind of handle from the same backend
#[derive(Debug)]
pub enum Node<D: Directory> {
    Directory(D),
    Regular(D::File),
}

impl<D: Directory> Node<D> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Directory(_) => NodeKind::Directory,
            Node::Regular(_) => NodeKind::Regular,
        }
    }

    pub fn size(&self) -> StorageResult<u64> {
        match self {
            Node::Directory(dir) => dir.size(),
            Node::Regular(file) => file.size(),
        }
    }

    /// Require a directory; `name` only feeds the error message.
    pub fn into_directory(self, name: &str) -> StorageResult<D> {
        match self {
            Node::Directory(dir) => Ok(dir),
            Node::Regular(_) => Err(StorageError::Directory(format!(
                "Expected directory, but received regular file '{}'",
                name
            ))),
        }
    }

    /// Require a regular file; `name` only feeds the error message.
    pub fn into_regular_file(self, name: &str) -> StorageResult<D::File> {
        match self {
            Node::Regular(file) => Ok(file),
            Node::Directory(_) => Err(StorageError::Directory(format!(
                "Expected regular file, but received directory '{}'",
                name
            ))),
        }
    }
}

/// Reject names that path resolution could never reach.
pub fn validate_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::InvalidInput("File name wasn't specified".to_string()));
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\0') {
        return Err(StorageError::InvalidInput(format!(
            "Invalid file name '{}'",
            name.escape_default()
        )));
    }
    Ok(())
}

/// Validate an absolute read of `nbytes` at `offset` against `size`.
pub fn check_read(offset: u64, nbytes: u64, size: u64) -> StorageResult<()> {
    match offset.checked_add(nbytes) {
        Some(end) if end <= size => Ok(()),
        _ => Err(StorageError::Internal(format!(
            "Cannot read {} bytes from offset {} (file size: {})",
            nbytes, offset, size
        ))),
    }
}

/// Validate a seek target against `size`.
pub fn check_seek(offset: u64, size: u64) -> StorageResult<()> {
    if offset >= size {
        return Err(StorageError::Internal(format!(
            "Cannot seek to offset {} (file size: {})",
            offset, size
        )));
    }
    Ok(())
}

/// Byte range of a partial read, validated against the file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRange {
    pub offset: u64,
    pub len: u64,
}

impl ReadRange {
    /// Resolve optional offset/size parameters.
    ///
    /// Offset defaults to 0 and may equal the file size; size defaults to the
    /// rest of the file.
    pub fn resolve(offset: Option<u64>, size: Option<u64>, file_size: u64) -> StorageResult<Self> {
        let offset = offset.unwrap_or(0);
        if offset > file_size {
            return Err(StorageError::Internal(format!(
                "Received incorrect offset (offset: {}, file size: {})",
                offset, file_size
            )));
        }
        let len = size.unwrap_or(file_size - offset);
        match offset.checked_add(len) {
            Some(end) if end <= file_size => Ok(Self { offset, len }),
            _ => Err(StorageError::Internal(format!(
                "Received incorrect read size (offset: {}, size: {}, file size: {})",
                offset, len, file_size
            ))),
        }
    }

    pub fn read<F: RegularFile>(&self, file: &F) -> StorageResult<Vec<u8>> {
        file.positional_read(self.offset, self.len)
    }
}
