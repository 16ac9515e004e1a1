//! A browsing session: one tree, one navigation state.
//!
//! All transitions go through [`Session`] so the selection can be kept
//! consistent with the rows it indexes.

use atlas_core::path::{self, ROOT};
use atlas_core::{Manifest, ManifestError, Node, VirtualTree, build_tree};
use atlas_query::{SortMode, visible_rows};

use crate::address::Address;
use crate::cursor::{Cursor, GRID_COLUMNS, Layout, ListNavigator, Movement, PAGE_SIZE};
use crate::preview::{PreviewRequest, PreviewTicket, PreviewTracker};
use crate::settings::{Bookmark, UserSettings};
use crate::state::NavigationState;

/// Result of activating the selected row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Nothing was selected.
    Nothing,
    /// A directory was entered.
    Navigated { path: String },
    /// A file should be previewed.
    PreviewRequested(PreviewRequest),
}

/// One entry of the breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    /// Text shown for the entry.
    pub label: String,
    /// Directory the entry navigates to.
    pub path: String,
}

/// Session controller owning the tree and the navigation state.
#[derive(Debug, Clone)]
pub struct Session {
    tree: VirtualTree,
    state: NavigationState,
    layout: Layout,
    grid_columns: usize,
    page_size: usize,
    reference_base: String,
    bookmarks: Vec<Bookmark>,
    back: Vec<NavigationState>,
    forward: Vec<NavigationState>,
    previews: PreviewTracker,
    address: Address,
    manifest_entries: usize,
    status: Option<String>,
}

impl Session {
    /// Start at the root with default state.
    pub fn new(tree: VirtualTree) -> Self {
        let manifest_entries = (tree.stats.entries_applied + tree.stats.entries_skipped) as usize;
        Self {
            tree,
            state: NavigationState::default(),
            layout: Layout::List,
            grid_columns: GRID_COLUMNS,
            page_size: PAGE_SIZE,
            reference_base: String::new(),
            bookmarks: Vec::new(),
            back: Vec::new(),
            forward: Vec::new(),
            previews: PreviewTracker::new(),
            address: Address::default(),
            manifest_entries,
            status: None,
        }
    }

    /// Build the tree from a manifest and start at the root.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self::new(build_tree(manifest))
    }

    /// Start from a load result. A failed load yields an empty tree and a
    /// status message.
    pub fn from_load_result(result: Result<Manifest, ManifestError>) -> Self {
        match result {
            Ok(manifest) => Self::from_manifest(&manifest),
            Err(err) => {
                tracing::warn!("manifest unavailable: {err}");
                let mut session = Self::new(VirtualTree::empty());
                session.status = Some(format!("Manifest not found: {err}"));
                session
            }
        }
    }

    /// Apply settings. Their state fields are used only when no address is
    /// given; an address always wins.
    pub fn configure(&mut self, settings: &UserSettings, address: Option<&str>) {
        self.set_layout(settings.layout());
        self.page_size = settings.page_size.max(1);
        self.reference_base = settings.reference_base.clone();
        self.bookmarks = settings.bookmarks.clone();
        match address {
            Some(address) => self.restore_address(address),
            None => {
                self.state.show_hidden = settings.show_hidden;
                self.state.sort_mode = settings.default_sort;
                self.reclamp();
                self.sync_address();
            }
        }
    }

    /// Set the layout used for cursor movement.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.set_layout(layout);
        self
    }

    /// Set the prefix used for external references.
    pub fn with_reference_base(mut self, base: impl Into<String>) -> Self {
        self.reference_base = base.into();
        self
    }

    pub fn tree(&self) -> &VirtualTree {
        &self.tree
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Switch the layout. A grid's width is remembered for
    /// [`toggle_layout`](Self::toggle_layout).
    pub fn set_layout(&mut self, layout: Layout) {
        if let Layout::Grid { columns } = layout {
            self.grid_columns = columns.max(1);
        }
        self.layout = layout;
    }

    /// Flip between the list and the last grid width.
    pub fn toggle_layout(&mut self) -> Layout {
        self.set_layout(match self.layout {
            Layout::List => Layout::grid(self.grid_columns),
            Layout::Grid { .. } => Layout::List,
        });
        self.layout
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    /// Navigate to a bookmark given its 1-based number or its label
    /// (case-insensitive). Returns false when nothing matches or the
    /// bookmarked directory is gone.
    pub fn open_bookmark(&mut self, key: &str) -> bool {
        let key = key.trim();
        let found = match key.parse::<usize>() {
            Ok(number) => number.checked_sub(1).and_then(|i| self.bookmarks.get(i)),
            Err(_) => self
                .bookmarks
                .iter()
                .find(|b| b.label.eq_ignore_ascii_case(key)),
        };
        let Some(target) = found.map(|b| b.path.clone()) else {
            self.status = Some(format!("No bookmark: {key}"));
            return false;
        };
        self.navigate(&target)
    }

    /// Last status message, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn current_directory(&self) -> &str {
        &self.state.current_directory
    }

    pub fn selection(&self) -> Option<usize> {
        self.state.selection
    }

    /// The ordered rows currently shown.
    pub fn visible_rows(&self) -> Vec<&Node> {
        visible_rows(&self.tree, &self.state.view())
    }

    /// The selected row, if any.
    pub fn selected_node(&self) -> Option<&Node> {
        let index = self.state.selection?;
        self.visible_rows().get(index).copied()
    }

    /// Enter a directory. Paths that do not resolve to a directory fall
    /// back to the root. Clears the search and the selection.
    ///
    /// Returns whether the path resolved.
    pub fn navigate(&mut self, target: &str) -> bool {
        let (directory, resolved) = self.validated_directory(target);
        let previous = self.state.without_selection();

        self.state.current_directory = directory;
        self.state.search_query.clear();
        self.state.selection = None;
        self.previews.invalidate();

        if !previous.same_view(&self.state) {
            self.back.push(previous);
            self.forward.clear();
        }
        self.sync_address();
        tracing::debug!(directory = %self.state.current_directory, "navigate");
        resolved
    }

    /// Go to the parent directory. Returns false at the root.
    pub fn go_to_parent(&mut self) -> bool {
        if self.state.current_directory == ROOT {
            return false;
        }
        let parent = path::parent_of(&self.state.current_directory);
        self.navigate(&parent)
    }

    /// Go to the root.
    pub fn go_to_root(&mut self) {
        self.navigate(ROOT);
    }

    /// Restore the previous navigation. Returns false when there is none.
    pub fn back(&mut self) -> bool {
        let Some(previous) = self.back.pop() else {
            return false;
        };
        self.forward.push(self.state.without_selection());
        self.apply_state(previous);
        true
    }

    /// Undo a [`back`](Self::back). Returns false when there is nothing to redo.
    pub fn forward(&mut self) -> bool {
        let Some(next) = self.forward.pop() else {
            return false;
        };
        self.back.push(self.state.without_selection());
        self.apply_state(next);
        true
    }

    /// Set the search term. The directory is unchanged; the search is
    /// scoped to it.
    pub fn set_search(&mut self, term: &str) {
        self.state.search_query = term.trim().to_string();
        self.state.selection = None;
        self.sync_address();
    }

    /// Stop searching.
    pub fn clear_search(&mut self) {
        self.set_search("");
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.state.sort_mode = mode;
        self.reclamp();
        self.sync_address();
    }

    pub fn set_show_hidden(&mut self, show: bool) {
        self.state.show_hidden = show;
        self.reclamp();
        self.sync_address();
    }

    pub fn toggle_hidden(&mut self) {
        self.set_show_hidden(!self.state.show_hidden);
    }

    /// Move the selection by `delta` rows, clamped to the visible rows.
    pub fn move_selection(&mut self, delta: isize) -> Option<usize> {
        let mut cursor = self.cursor();
        cursor.move_by(delta);
        self.state.selection = cursor.selected();
        self.state.selection
    }

    /// Apply a cursor movement under the session layout.
    pub fn apply_movement(&mut self, movement: Movement) -> Option<usize> {
        let mut cursor = self.cursor();
        cursor.apply(movement, self.layout);
        self.state.selection = cursor.selected();
        self.state.selection
    }

    /// Select a row directly. Returns false if the index is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        let mut cursor = self.cursor();
        cursor.set_selected(Some(index));
        if cursor.selected().is_some() {
            self.state.selection = Some(index);
            true
        } else {
            false
        }
    }

    /// Activate the selected row: enter a directory or request a preview.
    pub fn activate_selection(&mut self) -> Activation {
        let Some((target, is_dir)) = self
            .selected_node()
            .map(|node| (node.path.clone(), node.is_dir))
        else {
            return Activation::Nothing;
        };

        if is_dir {
            self.navigate(&target);
            Activation::Navigated {
                path: self.state.current_directory.clone(),
            }
        } else {
            match self.request_preview(&target) {
                Some(request) => Activation::PreviewRequested(request),
                None => Activation::Nothing,
            }
        }
    }

    /// Issue a preview request for a file. Returns `None` for directories
    /// and unknown paths.
    pub fn request_preview(&mut self, file: &str) -> Option<PreviewRequest> {
        let node = self.tree.resolve(file).filter(|n| n.is_file())?;
        Some(PreviewRequest {
            path: node.path.clone(),
            kind: node.kind(),
            reference: path::reference_url(&self.reference_base, &node.path),
            ticket: self.previews.issue(),
        })
    }

    /// Whether content loaded for `ticket` should be shown.
    pub fn accept_preview(&mut self, ticket: PreviewTicket) -> bool {
        self.previews.accept(ticket)
    }

    /// Set or clear the display label of a node. Labels are never written
    /// anywhere.
    pub fn rename_label(&mut self, target: &str, label: Option<&str>) -> bool {
        let found = self.tree.set_label(target, label);
        if !found {
            self.status = Some(format!("Cannot rename {target}"));
        }
        found
    }

    /// Replace the tree with a freshly built one. The current directory is
    /// kept if it still exists.
    pub fn reload(&mut self, manifest: &Manifest) {
        self.tree = build_tree(manifest);
        self.manifest_entries = manifest.len();
        self.previews.invalidate();
        let current = self.state.current_directory.clone();
        let (directory, resolved) = self.validated_directory(&current);
        if !resolved {
            self.state.search_query.clear();
        }
        self.state.current_directory = directory;
        self.state.selection = None;
        self.sync_address();
    }

    /// Restore navigation from an address. Keys the session does not own
    /// are kept for later writes.
    pub fn restore_address(&mut self, address: &str) {
        let parsed = Address::parse(address);
        let restored = parsed.restore();
        self.address = parsed;
        self.apply_state(restored);
    }

    /// The address describing the current state.
    pub fn address(&self) -> String {
        self.address.to_string()
    }

    /// Breadcrumb trail from the root to the current directory.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        path::ancestors(&self.state.current_directory)
            .into_iter()
            .map(|crumb| {
                let label = match self.tree.resolve(&crumb) {
                    _ if crumb == ROOT => "Root".to_string(),
                    Some(node) => node.display_name().to_string(),
                    None => path::file_name(&crumb).to_string(),
                };
                Breadcrumb { label, path: crumb }
            })
            .collect()
    }

    /// Breadcrumbs as one line, or the search banner while searching.
    pub fn breadcrumb_line(&self) -> String {
        if self.state.is_searching() {
            return format!("Search: “{}”", self.state.search_query);
        }
        self.breadcrumbs()
            .into_iter()
            .map(|crumb| crumb.label)
            .collect::<Vec<_>>()
            .join(" › ")
    }

    /// Row count, sort and hidden flag, plus the last status message.
    pub fn status_line(&self) -> String {
        let count = self.visible_rows().len();
        let mut line = format!(
            "{count} item{} • {} • hidden {}",
            if count == 1 { "" } else { "s" },
            self.state.sort_mode.short_label(),
            if self.state.show_hidden { "on" } else { "off" },
        );
        if let Some(status) = &self.status {
            line.push_str(" • ");
            line.push_str(status);
        }
        line
    }

    /// Index summary: version and entry count.
    pub fn index_summary(&self) -> String {
        match self.tree.version.as_deref() {
            Some(version) => {
                let short: String = version.chars().take(7).collect();
                format!("Indexed @ {short} • {} items", self.manifest_entries)
            }
            None => format!("{} items indexed", self.manifest_entries),
        }
    }

    fn cursor(&self) -> Cursor {
        Cursor::new(self.state.selection, self.visible_rows().len()).with_page_size(self.page_size)
    }

    fn reclamp(&mut self) {
        let len = self.visible_rows().len();
        self.state.selection = self.state.selection.filter(|&i| i < len);
    }

    fn validated_directory(&mut self, target: &str) -> (String, bool) {
        let directory = path::normalize(target);
        if self.tree.is_directory(&directory) {
            self.status = None;
            (directory, true)
        } else {
            tracing::warn!(path = %directory, "path not found, falling back to root");
            self.status = Some(format!("Path not found: {directory}"));
            (ROOT.to_string(), false)
        }
    }

    fn apply_state(&mut self, state: NavigationState) {
        let (directory, _) = self.validated_directory(&state.current_directory);
        self.state = NavigationState {
            current_directory: directory,
            selection: None,
            ..state
        };
        self.previews.invalidate();
        self.sync_address();
    }

    fn sync_address(&mut self) {
        self.address.apply_state(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::ManifestEntry;

    fn session() -> Session {
        Session::from_manifest(&Manifest::new(vec![
            ManifestEntry::file("docs/a.txt", 1),
            ManifestEntry::file("docs/b.png", 2),
            ManifestEntry::dir("docs/sub"),
            ManifestEntry::file(".env", 1),
        ]))
    }

    #[test]
    fn test_navigate_falls_back_to_root() {
        let mut s = session();
        assert!(s.navigate("/docs/"));
        assert_eq!(s.current_directory(), "/docs");

        assert!(!s.navigate("/docs/a.txt"));
        assert_eq!(s.current_directory(), "/");
        assert!(s.status().unwrap().contains("Path not found"));
    }

    #[test]
    fn test_navigate_clears_search_and_selection() {
        let mut s = session();
        s.set_search("a");
        s.move_selection(1);
        s.navigate("/docs");
        assert_eq!(s.state().search_query, "");
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn test_hidden_toggle_reclamps() {
        let mut s = session();
        s.set_show_hidden(true);
        assert_eq!(s.visible_rows().len(), 2);
        s.move_selection(2);
        assert_eq!(s.selection(), Some(1));
        s.set_show_hidden(false);
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn test_activate_directory_and_file() {
        let mut s = session();
        s.move_selection(1);
        assert_eq!(
            s.activate_selection(),
            Activation::Navigated {
                path: "/docs".into()
            }
        );

        s.move_selection(2);
        let Activation::PreviewRequested(request) = s.activate_selection() else {
            panic!("expected a preview request");
        };
        assert_eq!(request.path, "/docs/a.txt");
        assert_eq!(request.reference, "docs/a.txt");
        assert!(s.accept_preview(request.ticket));
    }

    #[test]
    fn test_navigation_invalidates_pending_preview() {
        let mut s = session();
        let request = s.request_preview("/docs/a.txt").unwrap();
        s.navigate("/docs");
        assert!(!s.accept_preview(request.ticket));
    }

    #[test]
    fn test_breadcrumbs() {
        let mut s = session();
        s.navigate("/docs/sub");
        let paths: Vec<_> = s.breadcrumbs().into_iter().map(|c| c.path).collect();
        assert_eq!(paths, vec!["/", "/docs", "/docs/sub"]);
        assert_eq!(s.breadcrumb_line(), "Root › docs › sub");
        s.set_search("x");
        assert_eq!(s.breadcrumb_line(), "Search: “x”");
    }

    #[test]
    fn test_toggle_layout_remembers_columns() {
        let mut s = session();
        assert_eq!(s.toggle_layout(), Layout::grid(GRID_COLUMNS));
        s.set_layout(Layout::grid(6));
        assert_eq!(s.toggle_layout(), Layout::List);
        assert_eq!(s.toggle_layout(), Layout::grid(6));
    }

    #[test]
    fn test_layout_change_keeps_selection() {
        let mut s = session();
        s.navigate("/docs");
        s.move_selection(2);
        assert_eq!(s.apply_movement(Movement::Right), Some(1));
        s.toggle_layout();
        assert_eq!(s.selection(), Some(1));
        assert_eq!(s.apply_movement(Movement::Right), Some(2));
    }

    #[test]
    fn test_open_bookmark() {
        let mut s = session();
        let settings = UserSettings {
            bookmarks: vec![Bookmark::new("Sub", "/docs/sub"), Bookmark::new("Gone", "/old")],
            ..UserSettings::default()
        };
        s.configure(&settings, None);

        assert!(s.open_bookmark("1"));
        assert_eq!(s.current_directory(), "/docs/sub");
        s.go_to_root();
        assert!(s.open_bookmark("sub"));
        assert_eq!(s.current_directory(), "/docs/sub");

        assert!(!s.open_bookmark("Gone"));
        assert_eq!(s.current_directory(), "/");

        assert!(!s.open_bookmark("0"));
        assert!(!s.open_bookmark("3"));
        assert_eq!(s.status(), Some("No bookmark: 3"));
    }

    #[test]
    fn test_status_line() {
        let s = session();
        assert_eq!(s.status_line(), "1 item • NM↑ • hidden off");
        assert_eq!(s.index_summary(), "4 items indexed");
    }
}
