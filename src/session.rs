//! Client sessions
//!
//! Binds client identifiers to the partition that serves them. The registry is
//! owned by the storage facade and emptied whenever the facade is cleared.

use crate::types::PartitionId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Client id -> partition id table
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, PartitionId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `client_id` to `partition`, returning the previous binding.
    pub fn bind(&self, client_id: &str, partition: PartitionId) -> Option<PartitionId> {
        self.sessions.write().insert(client_id.to_string(), partition)
    }

    pub fn get(&self, client_id: &str) -> Option<PartitionId> {
        self.sessions.read().get(client_id).copied()
    }

    pub fn unbind(&self, client_id: &str) -> Option<PartitionId> {
        self.sessions.write().remove(client_id)
    }

    /// Drop every binding that points at `partition`.
    pub fn unbind_partition(&self, partition: &PartitionId) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, bound| bound != partition);
        before - sessions.len()
    }

    /// All bindings, sorted by client id.
    pub fn list_all(&self) -> Vec<(String, PartitionId)> {
        let mut all: Vec<_> = self
            .sessions
            .read()
            .iter()
            .map(|(client, id)| (client.clone(), *id))
            .collect();
        all.sort();
        all
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.sessions.write().clear();
    }
}
