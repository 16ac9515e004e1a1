//! Exclusion matching for the manifest walker.

use std::path::Path;

use atlas_core::ScanError;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Compiled exclusion patterns.
///
/// A pattern excludes an entry when it matches either the entry's name or its
/// path relative to the walk root. Descendants of an excluded directory are
/// never visited.
#[derive(Debug, Clone)]
pub struct ExcludeMatcher {
    set: GlobSet,
    patterns: usize,
}

impl ExcludeMatcher {
    /// Compile a list of glob patterns.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ScanError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim_matches('/');
            if pattern.is_empty() {
                continue;
            }
            let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidConfig {
                message: format!("bad exclude pattern {pattern:?}: {e}"),
            })?;
            builder.add(glob);
        }

        let set = builder.build().map_err(|e| ScanError::InvalidConfig {
            message: e.to_string(),
        })?;
        let patterns = set.len();
        Ok(Self { set, patterns })
    }

    /// Number of compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns
    }

    /// Check an entry by name and by its root-relative path.
    pub fn is_excluded(&self, name: &str, relative: &Path) -> bool {
        if self.patterns == 0 {
            return false;
        }
        self.set.is_match(name) || self.set.is_match(relative)
    }
}

/// Exclusion pattern matching exactly one relative path, with glob
/// metacharacters escaped.
pub fn literal_pattern(relative: &str) -> String {
    globset::escape(relative)
}
