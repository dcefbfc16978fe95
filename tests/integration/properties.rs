//! Property tests: byte round-trips and path resolution.

use partfs::{
    Directory, DiskPartitionManager, ErrorKind, MemoryPartitionManager, NodeKind, Partition,
    PartitionId, PartitionManager, ReadRange, RegularFile,
};
use proptest::prelude::*;
use tempfile::TempDir;

fn names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9_.-]{0,7}", 1..6)
}

proptest! {
    #[test]
    fn memory_round_trip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let manager = MemoryPartitionManager::new();
        let partition = manager.create_partition(&PartitionId::generate()).unwrap();
        let file = partition.open_root().store_regular_file("blob", data.clone()).unwrap();

        prop_assert_eq!(file.size().unwrap(), data.len() as u64);
        prop_assert_eq!(file.positional_read(0, data.len() as u64).unwrap(), data);
    }

    #[test]
    fn memory_partial_reads_match_slices(
        data in prop::collection::vec(any::<u8>(), 1..512),
        offset in 0usize..512,
        len in 0usize..512,
    ) {
        let manager = MemoryPartitionManager::new();
        let partition = manager.create_partition(&PartitionId::generate()).unwrap();
        let file = partition.open_root().store_regular_file("blob", data.clone()).unwrap();

        let result = file.positional_read(offset as u64, len as u64);
        if offset + len <= data.len() {
            prop_assert_eq!(result.unwrap(), data[offset..offset + len].to_vec());
        } else {
            prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Internal);
        }

        let range = ReadRange::resolve(Some(offset as u64), None, data.len() as u64);
        prop_assert_eq!(range.is_ok(), offset <= data.len());
    }

    #[test]
    fn memory_nested_paths_resolve(path in names()) {
        let manager = MemoryPartitionManager::new();
        let partition = manager.create_partition(&PartitionId::generate()).unwrap();

        let mut dir = partition.open_root();
        for name in &path {
            dir = dir.create_directory(name).unwrap();
        }
        dir.store_regular_file("leaf", b"leaf".to_vec()).unwrap();

        let joined = format!("/{}", path.join("/"));
        prop_assert_eq!(partition.open(&joined).unwrap().kind(), NodeKind::Directory);
        let leaf = partition.open_regular_file(format!("{}/leaf", joined)).unwrap();
        prop_assert_eq!(leaf.positional_read(0, 4).unwrap(), b"leaf".to_vec());

        let through_file = format!("{}/leaf/below", joined);
        prop_assert_eq!(partition.open(&through_file).unwrap_err().kind(), ErrorKind::Directory);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn disk_round_trip(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let temp = TempDir::new().unwrap();
        let manager = DiskPartitionManager::new(temp.path().join("partitions"));
        let partition = manager.create_partition(&PartitionId::generate()).unwrap();
        partition.open_root().store_regular_file("blob", data.clone()).unwrap();

        let mut file = partition.open_regular_file("/blob").unwrap();
        prop_assert_eq!(file.size().unwrap(), data.len() as u64);
        prop_assert_eq!(file.read(data.len() as u64).unwrap(), data);
    }
}
