use pacfs::inode::{decode_virtual, directory_inode, virtual_inode};
use pacfs::{
    AccessMode, Catalog, DbConfig, EntryKind, Error, FsError, MountConfig, PackageRecord,
    PackageTree, ROOT_INODE,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn plain_config() -> MountConfig {
    MountConfig {
        mount_path: PathBuf::from("/mnt/pkgs"),
        desktop_entries: false,
        icon_lookup: false,
        ..MountConfig::default()
    }
}

fn tree_with(records: Vec<PackageRecord>, config: &MountConfig) -> PackageTree {
    let catalog = Catalog::from_records(records).unwrap();
    PackageTree::new(Arc::new(catalog), config).unwrap()
}

/// `alpha` 1.0 with no dependencies and `beta` 2.0 built from base `alpha`.
fn alpha_beta() -> PackageTree {
    let alpha = PackageRecord::new("alpha", "1.0");
    let mut beta = PackageRecord::new("beta", "2.0");
    beta.base = "alpha".to_string();
    beta.depends = vec!["alpha".to_string()];
    tree_with(vec![alpha, beta], &plain_config())
}

fn names(tree: &PackageTree, ino: u64) -> Vec<String> {
    tree.entries_after(ino, 0).unwrap().map(|e| e.name).collect()
}

fn entry_inode(tree: &PackageTree, dir: u64, name: &str) -> u64 {
    tree.entries_after(dir, 0)
        .unwrap()
        .find(|e| e.name == name)
        .map(|e| e.attr.ino)
        .unwrap()
}

#[test]
fn root_lists_packages_in_index_order() {
    let tree = alpha_beta();
    let entries: Vec<_> = tree.entries_after(ROOT_INODE, 0).unwrap().collect();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "alpha");
    assert_eq!(entries[1].name, "beta");
    assert_eq!(entries[0].attr.ino, directory_inode(0));
    assert_eq!(entries[1].attr.kind, EntryKind::Directory);
    assert_eq!(entries[1].attr.perm, 0o555);
}

#[test]
fn package_directory_lists_fields_then_links() {
    let tree = alpha_beta();
    assert_eq!(
        names(&tree, directory_inode(1)),
        vec![
            "2.0.version",
            "beta.txt",
            "local.db",
            "explicit.install",
            "alpha.base",
            "alpha.dep",
        ]
    );
    // base equals the name, so no .base file for alpha
    assert_eq!(
        names(&tree, directory_inode(0)),
        vec!["1.0.version", "alpha.txt", "local.db", "explicit.install"]
    );
}

#[test]
fn version_file_reads_back() {
    let tree = alpha_beta();
    let ino = entry_inode(&tree, directory_inode(1), "2.0.version");

    assert_eq!(tree.read(ino, 0, 4096).unwrap(), b"2.0");
    assert_eq!(tree.read(ino, 1, 4096).unwrap(), b".0");
    assert!(tree.read(ino, 3, 10).unwrap().is_empty());
    assert!(tree.read(ino, 1000, 10).unwrap().is_empty());

    let attr = tree.get_attributes(ino).unwrap();
    assert_eq!(attr.kind, EntryKind::RegularFile);
    assert_eq!(attr.size, 3);
    assert_eq!(attr.perm, 0o444);
}

#[test]
fn dependency_link_points_at_package_directory() {
    let tree = alpha_beta();
    let link = tree
        .entries_after(directory_inode(1), 0)
        .unwrap()
        .find(|e| e.name == "alpha.dep")
        .unwrap();

    assert_eq!(link.attr.kind, EntryKind::Symlink);
    assert_eq!(link.attr.nlink as u64, directory_inode(0));
    assert_eq!(
        tree.read_link(link.attr.ino).unwrap(),
        PathBuf::from("/mnt/pkgs/alpha")
    );
    assert_eq!(
        tree.read_link(directory_inode(1)).unwrap(),
        PathBuf::from("/mnt/pkgs/beta")
    );
    assert_eq!(tree.read(link.attr.ino, 0, 10), Err(FsError::NotFound(link.attr.ino)));
}

fn hub_tree(dep_count: usize, config: &MountConfig) -> PackageTree {
    let mut records: Vec<PackageRecord> = (0..dep_count)
        .map(|i| PackageRecord::new(format!("lib{:03}", i), "1"))
        .collect();
    let mut hub = PackageRecord::new("hub", "3.1");
    hub.depends = (0..dep_count).map(|i| format!("lib{:03}>=1", i)).collect();
    records.push(hub);
    tree_with(records, config)
}

#[test]
fn batch_size_does_not_change_listing() {
    let tree = hub_tree(40, &plain_config());
    let hub = directory_inode(tree.catalog().by_name("hub").unwrap().index);

    let all = tree.enumerate(hub, 0, usize::MAX).unwrap().entries;
    assert_eq!(all.len(), 4 + 40);

    for batch_size in [1, 3, 7, 16] {
        let mut collected = Vec::new();
        let mut cursor = 0;
        loop {
            let batch = tree.enumerate(hub, cursor, batch_size).unwrap();
            if batch.entries.is_empty() {
                break;
            }
            assert!(batch.entries.len() <= batch_size);
            cursor = batch.next_cursor;
            collected.extend(batch.entries);
        }
        assert_eq!(collected, all, "batch size {}", batch_size);
    }
}

#[test]
fn resuming_with_same_cursor_is_repeatable() {
    let tree = hub_tree(20, &plain_config());
    let hub = directory_inode(tree.catalog().by_name("hub").unwrap().index);

    let first = tree.enumerate(hub, 0, 5).unwrap();
    let again = tree.enumerate(hub, first.next_cursor, 5).unwrap();
    let once_more = tree.enumerate(hub, first.next_cursor, 5).unwrap();
    assert_eq!(again, once_more);
    assert!(again.entries[0].cursor > first.next_cursor);
}

#[test]
fn root_past_end_is_empty_and_idempotent() {
    let tree = alpha_beta();
    let all = tree.enumerate(ROOT_INODE, 0, 100).unwrap();
    assert_eq!(all.entries.len(), 2);

    for _ in 0..3 {
        let tail = tree.enumerate(ROOT_INODE, all.next_cursor, 100).unwrap();
        assert!(tail.entries.is_empty());
        assert_eq!(tail.next_cursor, all.next_cursor);
    }
    assert!(tree.enumerate(ROOT_INODE, u64::MAX, 10).unwrap().entries.is_empty());
}

#[test]
fn root_resumes_from_package_cursor() {
    let tree = hub_tree(5, &plain_config());
    let first = tree.enumerate(ROOT_INODE, 0, 2).unwrap();
    let rest = tree.enumerate(ROOT_INODE, first.next_cursor, 100).unwrap();

    let mut seen: Vec<String> = first.entries.into_iter().map(|e| e.name).collect();
    seen.extend(rest.entries.into_iter().map(|e| e.name));
    assert_eq!(seen, names(&tree, ROOT_INODE));
    assert_eq!(seen.len(), 6);
}

#[test]
fn unresolved_dependency_stops_links() {
    let alpha = PackageRecord::new("alpha", "1.0");
    let gamma = PackageRecord::new("gamma", "1.0");
    let mut beta = PackageRecord::new("beta", "2.0");
    beta.depends = vec![
        "alpha".to_string(),
        "sh".to_string(),
        "gamma".to_string(),
    ];
    let tree = tree_with(vec![alpha, beta, gamma], &plain_config());

    assert_eq!(
        names(&tree, directory_inode(1)),
        vec![
            "2.0.version",
            "beta.txt",
            "local.db",
            "explicit.install",
            "alpha.dep",
        ]
    );
}

#[test]
fn oversized_package_is_truncated_without_aliasing() {
    let config = MountConfig {
        max_entries_per_package: 6,
        ..plain_config()
    };
    let tree = hub_tree(10, &config);
    let index = tree.catalog().by_name("hub").unwrap().index;
    let hub = directory_inode(index);

    let entries: Vec<_> = tree.entries_after(hub, 0).unwrap().collect();
    assert_eq!(entries.len(), 6);
    assert_eq!(tree.overflowed_packages(), &[index]);

    let inodes: HashSet<u64> = entries.iter().map(|e| e.attr.ino).collect();
    assert_eq!(inodes.len(), entries.len());
    for (ordinal, entry) in entries.iter().enumerate() {
        assert_eq!(decode_virtual(entry.attr.ino).unwrap(), (index, ordinal));
        assert_eq!(tree.get_attributes(entry.attr.ino).unwrap().ino, entry.attr.ino);
    }

    let past = virtual_inode(index, 6).unwrap();
    assert_eq!(tree.get_attributes(past), Err(FsError::NotFound(past)));
}

#[test]
fn lookup_resolves_files_links_and_packages() {
    let alpha = PackageRecord::new("alpha", "1.0");
    let gamma = PackageRecord::new("gamma", "1.0");
    let mut beta = PackageRecord::new("beta", "2.0");
    beta.depends = vec!["alpha".to_string()];
    let tree = tree_with(vec![alpha, beta, gamma], &plain_config());
    let beta_dir = directory_inode(1);

    assert_eq!(tree.lookup(ROOT_INODE, "beta").unwrap().ino, beta_dir);
    assert_eq!(
        tree.lookup(beta_dir, "2.0.version").unwrap().kind,
        EntryKind::RegularFile
    );

    let link = tree.lookup(beta_dir, "alpha.dep").unwrap();
    assert_eq!(link.kind, EntryKind::Symlink);
    assert_eq!(link.ino, entry_inode(&tree, beta_dir, "alpha.dep"));

    // Not a dependency of beta: resolves globally to the directory.
    let gamma_dir = tree.lookup(beta_dir, "gamma.dep").unwrap();
    assert_eq!(gamma_dir.ino, directory_inode(2));
    assert!(gamma_dir.is_dir());

    assert_eq!(tree.lookup(ROOT_INODE, "Beta"), Err(FsError::NotFound(ROOT_INODE)));
    assert!(tree.lookup(beta_dir, "nothing.txt").is_err());
    assert_eq!(tree.lookup(link.ino, "x"), Err(FsError::NotADirectory(link.ino)));
    assert!(tree.lookup(directory_inode(50), "alpha").is_err());
}

#[test]
fn open_refuses_write_intent() {
    let tree = alpha_beta();
    let file = entry_inode(&tree, directory_inode(1), "beta.txt");

    assert_eq!(tree.open(file, AccessMode::ReadOnly), Ok(0));
    assert_eq!(
        tree.open(file, AccessMode::from_flags(1)),
        Err(FsError::PermissionDenied(file))
    );
    assert_eq!(
        tree.open(file, AccessMode::ReadWrite),
        Err(FsError::PermissionDenied(file))
    );
    assert_eq!(
        tree.open(ROOT_INODE, AccessMode::ReadOnly),
        Err(FsError::IsADirectory(ROOT_INODE))
    );
    assert_eq!(tree.open_dir(ROOT_INODE, AccessMode::ReadOnly), Ok(0));
    assert_eq!(
        tree.open_dir(file, AccessMode::ReadOnly),
        Err(FsError::NotADirectory(file))
    );
}

#[test]
fn unknown_inodes_are_not_found() {
    let tree = alpha_beta();
    let missing = directory_inode(2);

    assert_eq!(tree.get_attributes(missing), Err(FsError::NotFound(missing)));
    assert!(matches!(tree.entries_after(missing, 0), Err(FsError::NotFound(_))));
    assert!(tree.get_attributes(0).is_err());

    let file = entry_inode(&tree, directory_inode(0), "alpha.txt");
    assert!(matches!(
        tree.entries_after(file, 0),
        Err(FsError::NotADirectory(_))
    ));

    let stray = virtual_inode(7, 0).unwrap();
    assert_eq!(tree.read(stray, 0, 1), Err(FsError::NotFound(stray)));
}

#[test]
fn backup_file_is_read_from_root() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("etc")).unwrap();
    std::fs::write(root.path().join("etc/beta.conf"), "key = value\n").unwrap();

    let mut beta = PackageRecord::new("beta", "2.0");
    beta.backup = vec!["etc/beta.conf".to_string()];
    let config = MountConfig {
        db: DbConfig {
            root_dir: root.path().to_path_buf(),
            ..DbConfig::default()
        },
        ..plain_config()
    };
    let tree = tree_with(vec![beta], &config);

    let ino = entry_inode(&tree, directory_inode(0), "etc beta.conf.backup");
    assert_eq!(tree.read(ino, 0, 100).unwrap(), b"key = value\n");
    assert_eq!(tree.get_attributes(ino).unwrap().size, 12);
}

#[test]
fn desktop_entries_come_first_when_enabled() {
    let mut record = PackageRecord::new("firefox", "120.0-1");
    record.url = "https://www.mozilla.org".to_string();
    let config = MountConfig {
        desktop_entries: true,
        ..plain_config()
    };
    let tree = tree_with(vec![record], &config);
    let listing = names(&tree, directory_inode(0));

    assert_eq!(listing.first().map(String::as_str), Some(".directory"));
    assert!(listing.contains(&"url.desktop".to_string()));
    let url = entry_inode(&tree, directory_inode(0), "url.desktop");
    assert_eq!(tree.get_attributes(url).unwrap().perm, 0o555);
}

#[test]
fn concurrent_listings_agree() {
    let tree = Arc::new(hub_tree(30, &plain_config()));
    let hub = directory_inode(tree.catalog().by_name("hub").unwrap().index);
    let expected = tree.enumerate(hub, 0, usize::MAX).unwrap();

    let handles: Vec<_> = (1..5)
        .map(|batch_size| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                let mut out = Vec::new();
                let mut cursor = 0;
                loop {
                    let batch = tree.enumerate(hub, cursor, batch_size).unwrap();
                    if batch.entries.is_empty() {
                        return out;
                    }
                    cursor = batch.next_cursor;
                    out.extend(batch.entries);
                }
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected.entries);
    }
}

#[test]
fn missing_database_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config = MountConfig {
        db: DbConfig {
            db_path: temp.path().join("nowhere"),
            ..DbConfig::default()
        },
        ..plain_config()
    };
    let err = PackageTree::load(&config).unwrap_err();
    assert!(matches!(err, Error::CatalogUnavailable(_)));
}

#[test]
fn tree_loads_from_local_database() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("db");
    for (dir, desc) in [
        ("alpha-1.0-1", "%NAME%\nalpha\n\n%VERSION%\n1.0-1\n"),
        (
            "beta-2.0-1",
            "%NAME%\nbeta\n\n%VERSION%\n2.0-1\n\n%BASE%\nalpha\n\n%DEPENDS%\nalpha>=1\n",
        ),
    ] {
        let entry = db_path.join("local").join(dir);
        std::fs::create_dir_all(&entry).unwrap();
        std::fs::write(entry.join("desc"), desc).unwrap();
    }
    let config = MountConfig {
        db: DbConfig {
            root_dir: temp.path().to_path_buf(),
            db_path,
            pacman_conf: temp.path().join("pacman.conf"),
        },
        ..plain_config()
    };

    let tree = PackageTree::load(&config).unwrap();
    assert_eq!(names(&tree, ROOT_INODE), vec!["alpha", "beta"]);
    assert!(names(&tree, directory_inode(1)).contains(&"alpha.dep".to_string()));
}
