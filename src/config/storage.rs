//! StorageConfig and BootstrapConfig.

use super::paths;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the on-disk backend; None means the XDG data dir
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Default partition created at startup
    #[serde(default)]
    pub bootstrap: Option<BootstrapConfig>,
}

impl StorageConfig {
    /// Resolve the storage root to an actual filesystem location.
    pub fn resolve_root(&self) -> Result<PathBuf, ApiError> {
        match &self.root {
            Some(root) if !root.as_os_str().is_empty() => Ok(root.clone()),
            _ => paths::default_storage_root(),
        }
    }
}

/// Default partition and the root-level files it is seeded with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub partition: String,

    /// File name -> contents
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}
