//! Recursive name search and the visible row set.

use atlas_core::{Node, VirtualTree, path};
use itertools::Itertools;

use crate::order::SortMode;

/// Options controlling a recursive search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum depth below the search root (None = unlimited).
    /// Depth 1 only looks at immediate children.
    pub max_depth: Option<usize>,
}

impl SearchOptions {
    /// Limit the search to `depth` levels below the root.
    pub fn with_max_depth(depth: usize) -> Self {
        Self {
            max_depth: Some(depth),
        }
    }
}

/// Case-insensitive substring search over node names below `root_path`.
///
/// Results are every strict descendant whose name contains `term`, in
/// depth-first insertion order. An empty term, or a root that does not
/// resolve, matches nothing.
pub fn search<'t>(tree: &'t VirtualTree, root_path: &str, term: &str) -> Vec<&'t Node> {
    search_with(tree, root_path, term, &SearchOptions::default())
}

/// [`search`] with explicit options.
pub fn search_with<'t>(
    tree: &'t VirtualTree,
    root_path: &str,
    term: &str,
    options: &SearchOptions,
) -> Vec<&'t Node> {
    let needle = term.to_lowercase();
    let mut results = Vec::new();
    if needle.is_empty() {
        return results;
    }
    if let Some(start) = tree.resolve(root_path) {
        collect_matches(start, &needle, 1, options.max_depth, &mut results);
    }
    tracing::debug!(root = root_path, term, hits = results.len(), "search");
    results
}

fn collect_matches<'t>(
    node: &'t Node,
    needle: &str,
    depth: usize,
    max_depth: Option<usize>,
    out: &mut Vec<&'t Node>,
) {
    if max_depth.is_some_and(|max| depth > max) {
        return;
    }
    for child in node.children.values() {
        if child.name.to_lowercase().contains(needle) {
            out.push(child);
        }
        if child.is_dir {
            collect_matches(child, needle, depth + 1, max_depth, out);
        }
    }
}

/// Everything that determines which rows are shown and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSpec<'a> {
    /// Directory being listed, or the scope of the search.
    pub directory: &'a str,
    /// Search term; empty means plain listing.
    pub query: &'a str,
    /// Whether dotfiles are kept.
    pub show_hidden: bool,
    /// Ordering of the rows.
    pub sort: SortMode,
    /// Depth limit applied to searches.
    pub max_depth: Option<usize>,
}

impl<'a> ViewSpec<'a> {
    /// A plain listing of `directory` in default order.
    pub fn listing(directory: &'a str) -> Self {
        Self {
            directory,
            query: "",
            show_hidden: false,
            sort: SortMode::default(),
            max_depth: None,
        }
    }

    /// Whether the view is a search rather than a listing.
    pub fn is_search(&self) -> bool {
        !self.query.is_empty()
    }
}

/// Gather candidates, drop hidden rows, then order.
///
/// Only the row's own name decides whether it is hidden; search still
/// descends into hidden directories.
pub fn visible_rows<'t>(tree: &'t VirtualTree, view: &ViewSpec<'_>) -> Vec<&'t Node> {
    let candidates = if view.is_search() {
        let options = SearchOptions {
            max_depth: view.max_depth,
        };
        search_with(tree, view.directory, view.query, &options)
    } else {
        tree.children_of(view.directory)
    };

    candidates
        .into_iter()
        .filter(|node| view.show_hidden || !path::is_hidden(&node.name))
        .sorted_by(|a, b| view.sort.compare(a, b))
        .collect()
}
