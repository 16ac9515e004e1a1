//! Virtual tree container, structural queries and statistics.

use serde::{Deserialize, Serialize};

use crate::error::BuildWarning;
use crate::node::Node;
use crate::path::{self, ROOT};

/// Summary statistics for a built tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total size of all files in bytes.
    pub total_size: u64,
    /// Total number of files.
    pub total_files: u64,
    /// Total number of directories, excluding the root.
    pub total_dirs: u64,
    /// Deepest node below the root.
    pub max_depth: u32,
    /// Manifest records that were processed.
    pub entries_applied: u64,
    /// Manifest records that were skipped.
    pub entries_skipped: u64,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a file.
    pub fn record_file(&mut self, size: u64, depth: u32) {
        self.total_files += 1;
        self.total_size += size;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Record a directory.
    pub fn record_dir(&mut self, depth: u32) {
        self.total_dirs += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Walk a subtree and record every node below `node`.
    pub fn collect(&mut self, node: &Node, depth: u32) {
        for child in node.children.values() {
            if child.is_dir {
                self.record_dir(depth + 1);
                self.collect(child, depth + 1);
            } else {
                self.record_file(child.size, depth + 1);
            }
        }
    }
}

/// Directory tree reconstructed from a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualTree {
    /// Root node of the tree.
    pub root: Node,

    /// Opaque version carried over from the manifest.
    pub version: Option<String>,

    /// Summary statistics.
    pub stats: TreeStats,

    /// Records skipped or reinterpreted while building.
    pub warnings: Vec<BuildWarning>,
}

impl Default for VirtualTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl VirtualTree {
    /// A tree holding only the root directory.
    pub fn empty() -> Self {
        Self {
            root: Node::root(),
            version: None,
            stats: TreeStats::new(),
            warnings: Vec::new(),
        }
    }

    /// Walk segments from the root. Returns `None` when any segment is missing.
    pub fn resolve(&self, path: &str) -> Option<&Node> {
        path::segments(path).try_fold(&self.root, |node, segment| node.child(segment))
    }

    /// Mutable variant of [`resolve`](Self::resolve).
    pub fn resolve_mut(&mut self, path: &str) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for segment in path::segments(path) {
            node = node.children.get_mut(segment)?;
        }
        Some(node)
    }

    /// Immediate children of a directory, in insertion order.
    ///
    /// Empty when the path does not resolve or resolves to a file.
    pub fn children_of(&self, path: &str) -> Vec<&Node> {
        match self.resolve(path) {
            Some(node) if node.is_dir => node.children.values().collect(),
            _ => Vec::new(),
        }
    }

    /// Whether `path` resolves to a directory.
    pub fn is_directory(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|node| node.is_dir)
    }

    /// All nodes strictly below `path`, depth-first in insertion order.
    pub fn descendants(&self, path: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        if let Some(node) = self.resolve(path) {
            collect_descendants(node, &mut out);
        }
        out
    }

    /// Set or clear the cosmetic label of a node. Returns whether the node exists.
    ///
    /// The root cannot be relabelled.
    pub fn set_label(&mut self, path: &str, label: Option<&str>) -> bool {
        if path::normalize(path) == ROOT {
            return false;
        }
        match self.resolve_mut(path) {
            Some(node) => {
                node.label = label
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && *l != node.name.as_str())
                    .map(Into::into);
                true
            }
            None => false,
        }
    }

    /// Get the total number of files.
    pub fn total_files(&self) -> u64 {
        self.stats.total_files
    }

    /// Get the total number of directories.
    pub fn total_dirs(&self) -> u64 {
        self.stats.total_dirs
    }

    /// Whether the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Check if there were any warnings while building.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

fn collect_descendants<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    for child in node.children.values() {
        out.push(child);
        collect_descendants(child, out);
    }
}
