use atlas_core::{
    FileKind, Manifest, ManifestEntry, ScanConfig, TreeBuilder, WarningKind, build_tree, path,
};

fn manifest(entries: Vec<ManifestEntry>) -> Manifest {
    Manifest::new(entries)
}

#[test]
fn test_single_nested_file() {
    let tree = build_tree(&manifest(vec![ManifestEntry::file("/a/b.txt", 10)]));

    let root_children: Vec<_> = tree.children_of("/").iter().map(|n| n.path.clone()).collect();
    assert_eq!(root_children, vec!["/a"]);

    let a_children = tree.children_of("/a");
    assert_eq!(a_children.len(), 1);
    assert_eq!(a_children[0].name, "b.txt");
    assert!(a_children[0].is_file());
    assert_eq!(a_children[0].size, 10);
    assert_eq!(a_children[0].kind(), FileKind::Text);
    assert_eq!(tree.resolve("/a").unwrap().kind(), FileKind::Directory);
}

#[test]
fn test_entry_order_does_not_matter() {
    let forward = build_tree(&manifest(vec![
        ManifestEntry::dir("/x"),
        ManifestEntry::file("/x/y.txt", 5),
    ]));
    let backward = build_tree(&manifest(vec![
        ManifestEntry::file("/x/y.txt", 5),
        ManifestEntry::dir("/x"),
    ]));
    assert_eq!(forward.root, backward.root);
    assert_eq!(forward.stats, backward.stats);
}

#[test]
fn test_every_entry_is_listed_by_its_parent() {
    let entries = vec![
        ManifestEntry::file("readme.md", 3),
        ManifestEntry::file("docs//guide/intro.md", 7),
        ManifestEntry::dir("docs/"),
        ManifestEntry::file("/assets/img/logo.svg", 120),
        ManifestEntry::file(".env", 1),
        ManifestEntry::dir("empty"),
    ];
    let tree = build_tree(&manifest(entries.clone()));
    assert!(!tree.has_warnings());

    for entry in &entries {
        let normalized = path::normalize(&entry.path);
        let parent = path::parent_of(&entry.path);
        assert!(
            tree.children_of(&parent).iter().any(|n| n.path == normalized),
            "{normalized} missing from {parent}"
        );
    }
}

#[test]
fn test_downgraded_subtree_is_not_listed() {
    let entries = vec![
        ManifestEntry::file("site/a/one.txt", 1),
        ManifestEntry::file("site/keep.txt", 2),
        ManifestEntry::file("site/a", 9),
    ];
    let tree = build_tree(&manifest(entries.clone()));

    assert_eq!(tree.stats.entries_applied, 3);
    assert_eq!(tree.warnings.len(), 1);
    assert_eq!(tree.warnings[0].kind, WarningKind::Downgraded);

    let dropped = &tree.warnings[0].path;
    for entry in &entries {
        let normalized = path::normalize(&entry.path);
        let listed = tree
            .children_of(&path::parent_of(&entry.path))
            .iter()
            .any(|n| n.path == normalized);
        assert_eq!(listed, !path::is_descendant_of(&normalized, dropped), "{normalized}");
    }
}

#[test]
fn test_node_paths_follow_parent_paths() {
    let tree = build_tree(&manifest(vec![
        ManifestEntry::file("a/b/c/d.txt", 1),
        ManifestEntry::file("a/e.txt", 1),
    ]));
    for node in tree.descendants("/") {
        let parent = tree.resolve(&path::parent_of(&node.path)).unwrap();
        assert_eq!(node.path, parent.child_path(&node.name));
        assert!(parent.is_dir);
    }
}

#[test]
fn test_conflicting_entries_are_reported() {
    let tree = build_tree(&manifest(vec![
        ManifestEntry::file("/notes", 4),
        ManifestEntry::file("/notes/today.md", 2),
        ManifestEntry::file("/keep.txt", 1),
    ]));

    assert_eq!(tree.stats.entries_applied, 2);
    assert_eq!(tree.stats.entries_skipped, 1);
    assert_eq!(tree.warnings[0].kind, WarningKind::Conflict);
    assert!(tree.resolve("/keep.txt").is_some());
    assert!(tree.children_of("/notes").is_empty());
}

#[test]
fn test_stats() {
    let tree = build_tree(&manifest(vec![
        ManifestEntry::file("a/b/c.bin", 100),
        ManifestEntry::file("a/d.bin", 50),
        ManifestEntry::dir("z"),
    ]));
    assert_eq!(tree.total_files(), 2);
    assert_eq!(tree.total_dirs(), 3);
    assert_eq!(tree.stats.total_size, 150);
    assert_eq!(tree.stats.max_depth, 3);
    assert_eq!(tree.root.descendant_count(), 5);
}

#[test]
fn test_version_is_carried() {
    let mut m = manifest(vec![ManifestEntry::file("a", 1)]);
    m.version = Some("abc".into());
    let tree = TreeBuilder::from_manifest(&m);
    assert_eq!(tree.version.as_deref(), Some("abc"));
}

#[test]
fn test_manifest_round_trip_through_json() {
    let mut m = manifest(vec![
        ManifestEntry::dir("docs").with_mtime(1_700_000_000_000),
        ManifestEntry::file("docs/a.txt", 12),
    ]);
    m.version = Some("deadbeef".into());
    let text = m.to_json_pretty().unwrap();
    assert!(text.contains("\"isDir\": true"));
    assert_eq!(Manifest::from_json_str(&text).unwrap(), m);
}

#[test]
fn test_scan_config_default() {
    let config = ScanConfig::default();
    assert!(config.include_hidden);
    assert!(config.exclude_patterns.iter().any(|p| p == "node_modules"));
}
