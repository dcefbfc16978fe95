//! Configuration
//!
//! Layered configuration for the storage root, the bootstrap partition and
//! logging, loaded with the `config` crate.

mod facade;
pub mod paths;
mod sources;
mod storage;

pub use facade::ConfigLoader;
pub use storage::{BootstrapConfig, StorageConfig};

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartfsConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
