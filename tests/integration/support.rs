//! Shared fixtures: one harness per backend.

use partfs::{DiskPartitionManager, MemoryPartitionManager, PartitionManager, Storage};
use tempfile::TempDir;

pub const VALID_UUID: &str = "a2c59f5c-6c9b-4800-afb8-282fc5e743cc";
pub const OTHER_UUID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

/// A storage facade over one backend plus whatever keeps it alive.
pub trait Harness: Sized {
    type Manager: PartitionManager;

    fn new() -> Self;
    fn storage(&self) -> &Storage<Self::Manager>;
}

pub struct MemoryHarness {
    storage: Storage<MemoryPartitionManager>,
}

impl Harness for MemoryHarness {
    type Manager = MemoryPartitionManager;

    fn new() -> Self {
        Self {
            storage: Storage::new(MemoryPartitionManager::new()),
        }
    }

    fn storage(&self) -> &Storage<MemoryPartitionManager> {
        &self.storage
    }
}

pub struct DiskHarness {
    _temp: TempDir,
    storage: Storage<DiskPartitionManager>,
}

impl Harness for DiskHarness {
    type Manager = DiskPartitionManager;

    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(DiskPartitionManager::new(temp.path().join("partitions")));
        Self {
            _temp: temp,
            storage,
        }
    }

    fn storage(&self) -> &Storage<DiskPartitionManager> {
        &self.storage
    }
}

/// Instantiate every listed generic test for both backends.
macro_rules! for_each_backend {
    ($($test:ident),* $(,)?) => {
        mod memory {
            $(
                #[test]
                fn $test() {
                    super::$test::<$crate::integration::support::MemoryHarness>();
                }
            )*
        }

        mod disk {
            $(
                #[test]
                fn $test() {
                    super::$test::<$crate::integration::support::DiskHarness>();
                }
            )*
        }
    };
}
