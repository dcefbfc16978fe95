//! Core types shared by both storage backends.

use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// PartitionId: validated RFC-4122 identifier of a partition
///
/// Only constructible through [`PartitionId::parse`] or [`PartitionId::generate`],
/// so a malformed identifier never reaches a partition manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(Uuid);

impl PartitionId {
    /// Parse and validate a partition identifier.
    ///
    /// The nil UUID and UUIDs without a known version are rejected.
    pub fn parse(raw: &str) -> StorageResult<Self> {
        let invalid =
            || StorageError::InvalidInput(format!("Received incorrect partition id '{}'", raw));
        let uuid = Uuid::parse_str(raw).map_err(|_| invalid())?;
        match uuid.get_version_num() {
            1..=8 => Ok(Self(uuid)),
            _ => Err(invalid()),
        }
    }

    /// Fresh random (v4) identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Node kind: immutable for the lifetime of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Regular,
    Directory,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Regular => "Regular",
            NodeKind::Directory => "Directory",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DirEntry: point-in-time snapshot of one directory child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
    pub size: u64,
}
