//! Node and path-resolution contract, run against both backends.

use partfs::{Directory, ErrorKind, Node, NodeKind, Partition, RegularFile};

use super::support::{Harness, OTHER_UUID, VALID_UUID};

fn root_starts_empty<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    let root = partition.open_root();
    assert!(root.dir_entries().unwrap().is_empty());
    assert_eq!(root.kind(), NodeKind::Directory);
    assert_eq!(partition.open("/").unwrap().kind(), NodeKind::Directory);
}

fn store_and_read_back<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    let root = partition.open_root();
    let data = b"012345678901234";

    let mut file = root.store_regular_file("16B.txt", data.to_vec()).unwrap();
    assert_eq!(file.size().unwrap(), 15);
    assert_eq!(file.read(15).unwrap(), data);

    let entries = root.dir_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "16B.txt");
    assert_eq!(entries[0].kind, NodeKind::Regular);
    assert_eq!(entries[0].size, 15);

    let reopened = partition.open_regular_file("/16B.txt").unwrap();
    assert_eq!(reopened.positional_read(0, 15).unwrap(), data);
}

fn duplicate_store_keeps_original<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    let root = partition.open_root();
    root.store_regular_file("f", b"original".to_vec()).unwrap();

    let err = root.store_regular_file("f", b"replacement".to_vec()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    let err = root.create_directory("f").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let entries = root.dir_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, NodeKind::Regular);
    assert_eq!(entries[0].size, 8);
    let file = partition.open_regular_file("/f").unwrap();
    assert_eq!(file.positional_read(0, 8).unwrap(), b"original");
}

fn create_directory_then_open<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    let dir = partition.open_root().create_directory("tmp").unwrap();
    assert!(dir.dir_entries().unwrap().is_empty());

    let opened = partition.open("/tmp").unwrap();
    assert_eq!(opened.kind(), NodeKind::Directory);
    assert!(partition.open_dir("/tmp").is_ok());
}

fn listing_is_a_snapshot<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    let root = partition.open_root();
    root.create_directory("tmp").unwrap();
    root.store_regular_file("f.txt", b"hello".to_vec()).unwrap();

    let snapshot = root.dir_entries().unwrap();
    let names: Vec<_> = snapshot.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["f.txt", "tmp"]);
    assert_eq!(snapshot[0].kind, NodeKind::Regular);
    assert_eq!(snapshot[0].size, 5);
    assert_eq!(snapshot[1].kind, NodeKind::Directory);

    root.create_directory("later").unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(root.dir_entries().unwrap().len(), 3);
}

fn traversal_through_file_is_kind_error<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    partition
        .open_root()
        .store_regular_file("a", b"x".to_vec())
        .unwrap();

    let err = partition.open("/a/b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Directory);
    let err = partition.open("/a/b/c").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Directory);
}

fn kind_mismatch_on_final_component<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    let root = partition.open_root();
    root.create_directory("dir").unwrap();
    root.store_regular_file("file", b"x".to_vec()).unwrap();

    assert_eq!(
        partition.open_regular_file("/dir").unwrap_err().kind(),
        ErrorKind::Directory
    );
    assert_eq!(
        partition.open_dir("/file").unwrap_err().kind(),
        ErrorKind::Directory
    );
    assert_eq!(partition.open_dir("/").unwrap().dir_entries().unwrap().len(), 2);
}

fn missing_and_relative_paths_are_not_found<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    partition.open_root().create_directory("tmp").unwrap();

    for path in ["/missing", "/tmp/missing", "/missing/deeper", "tmp", "", "/tmp/../tmp"] {
        let err = partition.open(path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound, "path {:?}", path);
    }
}

fn resolution_is_case_sensitive<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    partition
        .open_root()
        .store_regular_file("Readme", b"x".to_vec())
        .unwrap();

    assert!(partition.open("/Readme").is_ok());
    assert_eq!(partition.open("/readme").unwrap_err().kind(), ErrorKind::NotFound);
}

fn nested_paths_resolve<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    let a = partition.open_root().create_directory("a").unwrap();
    let b = a.create_directory("b").unwrap();
    b.store_regular_file("c.txt", b"deep".to_vec()).unwrap();

    let file = partition.open_regular_file("/a/b/c.txt").unwrap();
    assert_eq!(file.positional_read(0, 4).unwrap(), b"deep");
    assert!(partition.open("//a///b/./c.txt").is_ok());

    match partition.open_from(&a, "b/c.txt").unwrap() {
        Node::Regular(file) => assert_eq!(file.size().unwrap(), 4),
        Node::Directory(_) => panic!("expected regular file"),
    }
    let same = partition.open_from(&a, "").unwrap();
    assert_eq!(same.kind(), NodeKind::Directory);
    match same {
        Node::Directory(dir) => assert_eq!(dir.dir_entries().unwrap()[0].name, "b"),
        Node::Regular(_) => panic!("expected directory"),
    }
}

fn cursor_reads<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    let mut file = partition
        .open_root()
        .store_regular_file("f", b"0123456789".to_vec())
        .unwrap();

    assert_eq!(file.read(3).unwrap(), b"012");
    assert_eq!(file.read(3).unwrap(), b"345");
    assert_eq!(file.cursor(), 6);

    file.seek(8).unwrap();
    assert_eq!(file.read(2).unwrap(), b"89");
    assert_eq!(file.seek(10).unwrap_err().kind(), ErrorKind::Internal);

    file.seek(7).unwrap();
    assert_eq!(file.read(4).unwrap_err().kind(), ErrorKind::Internal);
    assert_eq!(file.cursor(), 7);

    assert_eq!(file.positional_read(1, 2).unwrap(), b"12");
    assert_eq!(file.cursor(), 7);
    assert_eq!(
        file.positional_read(9, 2).unwrap_err().kind(),
        ErrorKind::Internal
    );
    assert!(file.positional_read(10, 0).unwrap().is_empty());
}

fn invalid_names_are_rejected<H: Harness>() {
    let harness = H::new();
    let partition = harness.storage().create_partition(VALID_UUID).unwrap();
    let root = partition.open_root();
    for name in ["", ".", "..", "a/b", "../escape"] {
        assert_eq!(
            root.store_regular_file(name, b"x".to_vec()).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            root.create_directory(name).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }
    assert!(root.dir_entries().unwrap().is_empty());
}

fn partitions_are_isolated<H: Harness>() {
    let harness = H::new();
    let first = harness.storage().create_partition(VALID_UUID).unwrap();
    let second = harness.storage().create_partition(OTHER_UUID).unwrap();
    first
        .open_root()
        .store_regular_file("only-here", b"x".to_vec())
        .unwrap();

    assert!(first.open("/only-here").is_ok());
    assert_eq!(
        second.open("/only-here").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(harness.storage().partition_count(), 2);
}

fn facade_gates_uuids<H: Harness>() {
    let harness = H::new();
    let storage = harness.storage();

    assert_eq!(
        storage.create_partition("not-a-uuid").unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
    assert_eq!(storage.partition_count(), 0);
    assert_eq!(
        storage.lookup_partition(VALID_UUID).unwrap_err().kind(),
        ErrorKind::NotFound
    );

    storage.create_partition(VALID_UUID).unwrap();
    assert_eq!(
        storage.create_partition(VALID_UUID).unwrap_err().kind(),
        ErrorKind::AlreadyExists
    );
    assert_eq!(storage.partition_count(), 1);
}

fn destroy_and_clear<H: Harness>() {
    let harness = H::new();
    let storage = harness.storage();
    storage.create_partition(VALID_UUID).unwrap();
    storage.create_partition(OTHER_UUID).unwrap();

    storage.destroy_partition(VALID_UUID).unwrap();
    assert_eq!(
        storage.lookup_partition(VALID_UUID).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    storage.destroy_partition(VALID_UUID).unwrap();

    storage.clear().unwrap();
    assert_eq!(storage.partition_count(), 0);
    assert!(storage.create_partition(OTHER_UUID).is_ok());
}

for_each_backend!(
    root_starts_empty,
    store_and_read_back,
    duplicate_store_keeps_original,
    create_directory_then_open,
    listing_is_a_snapshot,
    traversal_through_file_is_kind_error,
    kind_mismatch_on_final_component,
    missing_and_relative_paths_are_not_found,
    resolution_is_case_sensitive,
    nested_paths_resolve,
    cursor_reads,
    invalid_names_are_rejected,
    partitions_are_isolated,
    facade_gates_uuids,
    destroy_and_clear,
);
