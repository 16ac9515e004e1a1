use atlas_core::{Manifest, ManifestEntry, ManifestError};
use atlas_nav::{
    Activation, Layout, Movement, NavigationState, PreviewContent, PreviewLoader, Session,
    UserSettings, address,
};
use atlas_query::SortMode;
use strum::IntoEnumIterator;

fn manifest() -> Manifest {
    let mut manifest = Manifest::new(vec![
        ManifestEntry::file("docs/a/report.pdf", 300),
        ManifestEntry::file("docs/notes.txt", 12),
        ManifestEntry::file("docs/.secret", 1),
        ManifestEntry::file("docs/big.log", 10),
        ManifestEntry::file("other/report.txt", 20),
        ManifestEntry::file("photo.jpg", 999),
    ]);
    manifest.version = Some("0123456789".into());
    manifest
}

#[test]
fn test_restore_scenario_address() {
    let mut session = Session::from_manifest(&manifest());
    session.restore_address("?path=/docs&sort=size-desc&hidden=1");

    let state = session.state();
    assert_eq!(state.current_directory, "/docs");
    assert_eq!(state.sort_mode, SortMode::SizeDescending);
    assert!(state.show_hidden);
    assert_eq!(state.search_query, "");
    assert_eq!(state.selection, None);
}

#[test]
fn test_address_round_trip() {
    let dirs = ["/", "/docs", "/docs/a", "/with space/ünï"];
    let queries = ["", "report", "a&b=c", "100%"];
    for dir in dirs {
        for query in queries {
            for sort_mode in SortMode::iter() {
                for show_hidden in [false, true] {
                    let state = NavigationState {
                        current_directory: dir.to_string(),
                        show_hidden,
                        sort_mode,
                        search_query: query.to_string(),
                        selection: None,
                    };
                    let serialized = address::serialize(&state);
                    assert_eq!(address::restore(&serialized), state, "{serialized}");
                    let again = address::serialize(&address::restore(&serialized));
                    assert_eq!(again, serialized);
                }
            }
        }
    }
}

#[test]
fn test_restore_unknown_path_falls_back_to_root() {
    let mut session = Session::from_manifest(&manifest());
    session.restore_address("?path=/nowhere&q=report");
    assert_eq!(session.current_directory(), "/");
    assert_eq!(session.state().search_query, "report");
    assert_eq!(session.visible_rows().len(), 2);
}

#[test]
fn test_session_keeps_foreign_keys() {
    let mut session = Session::from_manifest(&manifest());
    session.restore_address("?theme=dark&path=/docs");
    session.set_sort_mode(SortMode::DateDescending);
    assert_eq!(session.address(), "?theme=dark&path=/docs&sort=date-desc");
    session.go_to_root();
    assert_eq!(session.address(), "?theme=dark&sort=date-desc");
}

#[test]
fn test_search_scoped_to_current_directory() {
    let mut session = Session::from_manifest(&manifest());
    session.navigate("/docs");
    session.set_search("  report ");
    let rows: Vec<_> = session.visible_rows().iter().map(|n| n.path.clone()).collect();
    assert_eq!(rows, vec!["/docs/a/report.pdf"]);
    assert_eq!(session.current_directory(), "/docs");
}

#[test]
fn test_selection_clamps() {
    let mut session = Session::from_manifest(&manifest());
    session.navigate("/docs");
    assert_eq!(session.visible_rows().len(), 3);

    assert_eq!(session.move_selection(-1), Some(0));
    assert_eq!(session.move_selection(100), Some(2));
    assert_eq!(session.move_selection(-100), Some(0));

    session.set_search("zzz");
    assert_eq!(session.move_selection(1), None);
}

#[test]
fn test_sort_change_keeps_valid_selection() {
    let mut session = Session::from_manifest(&manifest());
    session.navigate("/docs");
    session.move_selection(3);
    session.set_sort_mode(SortMode::SizeDescending);
    assert_eq!(session.selection(), Some(2));
}

#[test]
fn test_grid_layout_moves_by_columns() {
    let mut session = Session::from_manifest(&manifest()).with_layout(Layout::grid(2));
    session.set_show_hidden(true);
    session.navigate("/docs");
    assert_eq!(session.apply_movement(Movement::Right), Some(0));
    assert_eq!(session.apply_movement(Movement::Down), Some(2));
    assert_eq!(session.apply_movement(Movement::End), Some(3));
    assert_eq!(session.apply_movement(Movement::Down), Some(3));
}

#[test]
fn test_back_and_forward() {
    let mut session = Session::from_manifest(&manifest());
    session.navigate("/docs");
    session.navigate("/docs/a");
    assert!(session.go_to_parent());
    assert_eq!(session.current_directory(), "/docs");

    assert!(session.back());
    assert_eq!(session.current_directory(), "/docs/a");
    assert!(session.back());
    assert_eq!(session.current_directory(), "/docs");
    assert!(session.forward());
    assert_eq!(session.current_directory(), "/docs/a");

    session.navigate("/other");
    assert!(!session.forward());
}

#[test]
fn test_failed_load_degrades_to_empty_tree() {
    let err = ManifestError::io(
        "manifest.json",
        std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    );
    let session = Session::from_load_result(Err(err));
    assert!(session.tree().is_empty());
    assert!(session.visible_rows().is_empty());
    assert!(session.status().unwrap().contains("Manifest not found"));
}

#[test]
fn test_settings_seed_only_without_address() {
    let settings = UserSettings {
        show_hidden: true,
        default_sort: SortMode::TypeDescending,
        grid_columns: Some(3),
        ..UserSettings::default()
    };

    let mut seeded = Session::from_manifest(&manifest());
    seeded.configure(&settings, None);
    assert!(seeded.state().show_hidden);
    assert_eq!(seeded.state().sort_mode, SortMode::TypeDescending);
    assert_eq!(seeded.layout(), Layout::grid(3));

    let mut addressed = Session::from_manifest(&manifest());
    addressed.configure(&settings, Some("?path=/docs"));
    assert!(!addressed.state().show_hidden);
    assert_eq!(addressed.state().sort_mode, SortMode::NameAscending);
    assert_eq!(addressed.current_directory(), "/docs");
}

#[test]
fn test_rename_is_cosmetic() {
    let mut session = Session::from_manifest(&manifest());
    assert!(session.rename_label("/docs/notes.txt", Some("Notes (draft).txt")));
    let node = session.tree().resolve("/docs/notes.txt").unwrap();
    assert_eq!(node.display_name(), "Notes (draft).txt");
    assert_eq!(node.name, "notes.txt");
    assert!(!session.rename_label("/", Some("x")));
}

#[test]
fn test_reload_revalidates_directory() {
    let mut session = Session::from_manifest(&manifest());
    session.navigate("/other");
    session.reload(&Manifest::new(vec![ManifestEntry::file("docs/x.txt", 1)]));
    assert_eq!(session.current_directory(), "/");
    assert_eq!(session.index_summary(), "1 items indexed");
}

#[tokio::test]
async fn test_preview_loader_reads_text() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("docs")).unwrap();
    std::fs::write(dir.path().join("docs/notes.txt"), "hello\nworld\n").unwrap();
    std::fs::write(dir.path().join("docs/big.log"), "x".repeat(64)).unwrap();

    let loader = PreviewLoader::new(dir.path()).with_max_bytes(32);
    let mut session = Session::from_manifest(&manifest());
    session.navigate("/docs");

    let notes = session.request_preview("/docs/notes.txt").unwrap();
    let content = loader.load_content(&notes).await;
    assert!(session.accept_preview(notes.ticket));
    assert_eq!(
        content,
        PreviewContent::Text {
            text: "hello\nworld\n".into(),
            reference: "docs/notes.txt".into()
        }
    );

    let big = session.request_preview("/docs/big.log").unwrap();
    let content = loader.load_content(&big).await;
    assert!(matches!(content, PreviewContent::TooLarge { size: 64, .. }));
}

#[tokio::test]
async fn test_stale_preview_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let loader = PreviewLoader::new(dir.path());
    let mut session = Session::from_manifest(&manifest()).with_reference_base("https://cdn.test/");

    let first = session.request_preview("/photo.jpg").unwrap();
    let second = session.request_preview("/docs/notes.txt").unwrap();

    let media = loader.load_content(&first).await;
    assert_eq!(media.reference(), "https://cdn.test/photo.jpg");
    assert!(matches!(media, PreviewContent::Media { .. }));
    assert!(!session.accept_preview(first.ticket));

    let missing = loader.load_content(&second).await;
    assert!(matches!(missing, PreviewContent::Unavailable { .. }));
    assert!(session.accept_preview(second.ticket));
}

#[test]
fn test_activation_from_search_results() {
    let mut session = Session::from_manifest(&manifest());
    session.set_search("report");
    session.move_selection(1);
    match session.activate_selection() {
        Activation::PreviewRequested(request) => {
            assert_eq!(request.path, "/docs/a/report.pdf");
            assert_eq!(request.kind.to_string(), "pdf");
        }
        other => panic!("unexpected {other:?}"),
    }
}
