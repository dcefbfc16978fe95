//! Storage facade
//!
//! Entry point for request handlers. Validates partition identifiers before a
//! manager is consulted, serializes partition creation so that at most one
//! partition is ever created per id, and owns the client session table.

use crate::config::BootstrapConfig;
use crate::error::{StorageError, StorageResult};
use crate::node::Directory;
use crate::partition::{Partition, PartitionManager};
use crate::session::SessionRegistry;
use crate::types::PartitionId;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Partition handle handed out by a facade over manager `M`.
pub type PartitionHandle<M> = Arc<<M as PartitionManager>::Partition>;

/// UUID-validating, creation-serializing wrapper around a partition manager
#[derive(Debug)]
pub struct Storage<M: PartitionManager> {
    manager: M,
    create_lock: Mutex<()>,
    sessions: SessionRegistry,
}

impl<M: PartitionManager> Storage<M> {
    pub fn new(manager: M) -> Self {
        Self {
            manager,
            create_lock: Mutex::new(()),
            sessions: SessionRegistry::new(),
        }
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Find an existing partition; absence is `NotFound`.
    pub fn lookup_partition(&self, uuid: &str) -> StorageResult<PartitionHandle<M>> {
        let id = PartitionId::parse(uuid)?;
        debug!(partition = %id, "Looking up partition");
        self.lookup_by_id(&id)
    }

    /// Create a partition; a concurrent or earlier creation of the same id
    /// makes this call fail `AlreadyExists`.
    pub fn create_partition(&self, uuid: &str) -> StorageResult<PartitionHandle<M>> {
        let id = PartitionId::parse(uuid)?;
        let _guard = self.create_lock.lock();
        self.create_locked(&id)
    }

    /// Return the partition for `uuid`, creating it if needed.
    pub fn ensure_partition(&self, uuid: &str) -> StorageResult<PartitionHandle<M>> {
        let id = PartitionId::parse(uuid)?;
        let _guard = self.create_lock.lock();
        match self.manager.lookup_partition(&id) {
            Some(partition) => Ok(partition),
            None => self.manager.create_partition(&id),
        }
    }

    /// Destroy one partition and every session bound to it.
    ///
    /// In-flight holders of the partition keep their handle; new lookups fail.
    pub fn destroy_partition(&self, uuid: &str) -> StorageResult<()> {
        let id = PartitionId::parse(uuid)?;
        let _guard = self.create_lock.lock();
        let unbound = self.sessions.unbind_partition(&id);
        if unbound > 0 {
            debug!(partition = %id, sessions = unbound, "Unbound sessions of destroyed partition");
        }
        self.manager.destroy_partition(&id)
    }

    /// Remove every partition and every session.
    pub fn clear(&self) -> StorageResult<()> {
        let _guard = self.create_lock.lock();
        self.sessions.clear();
        self.manager.clear()
    }

    pub fn partition_count(&self) -> usize {
        self.manager.partition_count()
    }

    /// Partition of `client_id`, creating a fresh one on first contact.
    pub fn open_session(&self, client_id: &str) -> StorageResult<PartitionHandle<M>> {
        validate_client(client_id)?;
        let _guard = self.create_lock.lock();
        if let Some(id) = self.sessions.get(client_id) {
            if let Some(partition) = self.manager.lookup_partition(&id) {
                return Ok(partition);
            }
        }

        let id = PartitionId::generate();
        let partition = self.create_locked(&id)?;
        self.sessions.bind(client_id, id);
        info!(client = client_id, partition = %id, "Opened session");
        Ok(partition)
    }

    /// Partition bound to `client_id`; `NotFound` if the client has no session.
    pub fn session_partition(&self, client_id: &str) -> StorageResult<PartitionHandle<M>> {
        validate_client(client_id)?;
        let id = self.sessions.get(client_id).ok_or_else(|| {
            StorageError::NotFound(format!("No session for client '{}'", client_id))
        })?;
        self.lookup_by_id(&id)
    }

    /// Forget the session of `client_id`. The partition itself is kept.
    pub fn close_session(&self, client_id: &str) -> Option<PartitionId> {
        self.sessions.unbind(client_id)
    }

    /// Ensure the default partition exists and seed its root with `config.files`.
    ///
    /// Files already present are left as they are.
    pub fn bootstrap(&self, config: &BootstrapConfig) -> StorageResult<PartitionHandle<M>> {
        let partition = self.ensure_partition(&config.partition)?;
        let root = partition.open_root();
        for (name, contents) in &config.files {
            match root.store_regular_file(name, contents.as_bytes().to_vec()) {
                Ok(_) => debug!(file = %name, "Seeded bootstrap file"),
                Err(StorageError::AlreadyExists(_)) => {
                    debug!(file = %name, "Bootstrap file already present")
                }
                Err(e) => return Err(e),
            }
        }
        info!(partition = %partition.id(), files = config.files.len(), "Bootstrapped default partition");
        Ok(partition)
    }

    fn lookup_by_id(&self, id: &PartitionId) -> StorageResult<PartitionHandle<M>> {
        self.manager
            .lookup_partition(id)
            .ok_or_else(|| StorageError::NotFound(format!("Partition with id '{}' not found", id)))
    }

    /// Check-then-create; the caller holds `create_lock`.
    fn create_locked(&self, id: &PartitionId) -> StorageResult<PartitionHandle<M>> {
        if self.manager.lookup_partition(id).is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "Partition with id '{}' already exists",
                id
            )));
        }
        self.manager.create_partition(id)
    }
}

fn validate_client(client_id: &str) -> StorageResult<()> {
    if client_id.trim().is_empty() {
        return Err(StorageError::InvalidInput(
            "Client id wasn't specified".to_string(),
        ));
    }
    Ok(())
}
