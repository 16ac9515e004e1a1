//! Reconstruct a directory tree from flat manifest records.
//!
//! Each record is applied in two explicit steps:
//!
//! 1. [`ensure_parents`](TreeBuilder::ensure_parents) creates or fetches every
//!    directory above the record. Directories created here are implicit:
//!    `is_dir = true`, size 0, no mtime.
//! 2. [`apply_leaf`](TreeBuilder::apply_leaf) creates or fetches the record's
//!    own node and overwrites its attributes in place, so children gathered
//!    from earlier, deeper records survive.
//!
//! Records that cannot be applied are skipped and reported as
//! [`BuildWarning`]s. The build itself never fails.

use compact_str::CompactString;

use crate::error::BuildWarning;
use crate::manifest::{Manifest, ManifestEntry};
use crate::node::Node;
use crate::path;
use crate::tree::{TreeStats, VirtualTree};

/// Incremental tree builder over manifest records.
#[derive(Debug)]
pub struct TreeBuilder {
    root: Node,
    warnings: Vec<BuildWarning>,
    applied: u64,
    skipped: u64,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Create a builder holding only the root.
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            warnings: Vec::new(),
            applied: 0,
            skipped: 0,
        }
    }

    /// Build a tree from a whole manifest.
    pub fn from_manifest(manifest: &Manifest) -> VirtualTree {
        let mut builder = Self::new();
        builder.extend(&manifest.files);
        builder.finish(manifest.version.clone())
    }

    /// Apply records in order.
    pub fn extend<'a>(&mut self, entries: impl IntoIterator<Item = &'a ManifestEntry>) {
        for entry in entries {
            self.push(entry);
        }
    }

    /// Apply one record. Returns whether it was applied.
    pub fn push(&mut self, entry: &ManifestEntry) -> bool {
        let normalized = path::normalize(&entry.path);
        let segments: Vec<&str> = path::segments(&normalized).collect();

        let Some((leaf, parents)) = segments.split_last() else {
            self.skip(BuildWarning::empty_path(&entry.path));
            return false;
        };

        let outcome = match Self::ensure_parents(&mut self.root, parents) {
            Ok(parent) => Ok(Self::apply_leaf(parent, leaf, entry)),
            Err(blocking_file) => Err(BuildWarning::conflict(&normalized, &blocking_file)),
        };

        match outcome {
            Ok(downgrade) => {
                self.applied += 1;
                if let Some(warning) = downgrade {
                    tracing::warn!(path = %warning.path, "{}", warning.message);
                    self.warnings.push(warning);
                }
                true
            }
            Err(warning) => {
                self.skip(warning);
                false
            }
        }
    }

    /// Finish the build and compute statistics.
    pub fn finish(self, version: Option<String>) -> VirtualTree {
        let mut stats = TreeStats::new();
        stats.collect(&self.root, 0);
        stats.entries_applied = self.applied;
        stats.entries_skipped = self.skipped;

        tracing::debug!(
            files = stats.total_files,
            dirs = stats.total_dirs,
            skipped = stats.entries_skipped,
            "built virtual tree"
        );

        VirtualTree {
            root: self.root,
            version,
            stats,
            warnings: self.warnings,
        }
    }

    /// Phase one: walk or create every directory above the leaf.
    ///
    /// Fails with the path of the first file found where a directory is
    /// needed.
    fn ensure_parents<'a>(root: &'a mut Node, parents: &[&str]) -> Result<&'a mut Node, String> {
        let mut current = root;
        for segment in parents {
            let child_path = current.child_path(segment);
            let child = current
                .children
                .entry(CompactString::from(*segment))
                .or_insert_with(|| Node::new_directory(*segment, child_path));
            if !child.is_dir {
                return Err(child.path.clone());
            }
            current = child;
        }
        Ok(current)
    }

    /// Phase two: create or fetch the leaf and overwrite its attributes.
    ///
    /// A file record for a node that already has children wins; the subtree
    /// is dropped and reported.
    fn apply_leaf(parent: &mut Node, name: &str, entry: &ManifestEntry) -> Option<BuildWarning> {
        let child_path = parent.child_path(name);
        let node = parent
            .children
            .entry(CompactString::from(name))
            .or_insert_with(|| Node::new_directory(name, child_path));

        let mut warning = None;
        if !entry.is_dir && !node.children.is_empty() {
            let dropped = node.descendant_count();
            node.children.clear();
            warning = Some(BuildWarning::downgraded(node.path.clone(), dropped));
        }

        node.is_dir = entry.is_dir;
        node.size = if entry.is_dir { 0 } else { entry.size };
        node.mtime = entry.mtime_millis();
        warning
    }

    fn skip(&mut self, warning: BuildWarning) {
        tracing::warn!(path = %warning.path, "skipping manifest entry: {}", warning.message);
        self.skipped += 1;
        self.warnings.push(warning);
    }
}

/// Build a tree from a manifest.
pub fn build_tree(manifest: &Manifest) -> VirtualTree {
    TreeBuilder::from_manifest(manifest)
}
