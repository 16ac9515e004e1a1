//! JWalk-based manifest generator.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use atlas_core::{Manifest, ManifestEntry, ScanConfig, ScanError};
use chrono::{DateTime, SecondsFormat, Utc};
use jwalk::{Parallelism, WalkDir};

use crate::exclude::ExcludeMatcher;
use crate::version::detect_version;

/// Walks a directory in parallel and emits one manifest record per file and
/// per directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct JwalkScanner;

impl JwalkScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Generate a manifest for `config.root`.
    ///
    /// Paths are relative to the root with `/` separators and records are
    /// sorted by path. Unreadable entries are logged and skipped.
    pub fn scan(&self, config: &ScanConfig) -> Result<Manifest, ScanError> {
        let start = Instant::now();
        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let matcher = Arc::new(ExcludeMatcher::new(&config.exclude_patterns)?);
        tracing::debug!(root = %root_path.display(), patterns = matcher.pattern_count(), "walking");
        let (mut files, skipped) = self.collect_entries(config, &root_path, matcher)?;
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let version = if config.detect_version {
            detect_version(&root_path)
        } else {
            None
        };

        tracing::debug!(
            root = %root_path.display(),
            entries = files.len(),
            skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generated manifest"
        );

        Ok(Manifest {
            version,
            generated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            files,
        })
    }

    /// Walk the root and collect records, returning them with the number of
    /// entries that could not be read.
    fn collect_entries(
        &self,
        config: &ScanConfig,
        root_path: &Path,
        matcher: Arc<ExcludeMatcher>,
    ) -> Result<(Vec<ManifestEntry>, usize), ScanError> {
        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let prune_root: PathBuf = root_path.to_path_buf();
        let walker = WalkDir::new(root_path)
            .parallelism(parallelism)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .min_depth(0)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX))
            .process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|child| match child {
                    Ok(entry) => {
                        let path = entry.path();
                        let relative = path.strip_prefix(&prune_root).unwrap_or(path.as_path());
                        !matcher.is_excluded(&entry.file_name().to_string_lossy(), relative)
                    }
                    Err(_) => true,
                });
            });

        let mut files = Vec::new();
        let mut skipped = 0usize;

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    tracing::warn!(path = %path.display(), "skipping unreadable entry: {err}");
                    skipped += 1;
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let Some(relative) = relative_path(root_path, &path) else {
                continue;
            };

            let file_type = entry.file_type();
            if !file_type.is_dir() && !file_type.is_file() {
                tracing::debug!(path = %relative, "skipping special entry");
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    tracing::warn!(path = %relative, "skipping entry without metadata: {err}");
                    skipped += 1;
                    continue;
                }
            };

            let record = if file_type.is_dir() {
                ManifestEntry::dir(relative)
            } else {
                ManifestEntry::file(relative, metadata.len())
            };

            files.push(match metadata.modified() {
                Ok(modified) => record.with_mtime(DateTime::<Utc>::from(modified).timestamp_millis()),
                Err(_) => record,
            });
        }

        Ok((files, skipped))
    }
}

/// Root-relative path with `/` separators, or `None` outside the root.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    (!segments.is_empty()).then(|| segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("docs/a")).unwrap();
        fs::create_dir(root.join("media")).unwrap();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        fs::write(root.join("docs/notes.txt"), "hello").unwrap();
        fs::write(root.join("docs/a/report.pdf"), "%PDF-1.4").unwrap();

        temp
    }

    fn config(root: &Path) -> ScanConfig {
        ScanConfig {
            detect_version: false,
            ..ScanConfig::new(root)
        }
    }

    #[test]
    fn test_basic_scan() {
        let temp = create_test_tree();
        let manifest = JwalkScanner::new().scan(&config(temp.path())).unwrap();

        let paths: Vec<_> = manifest.files.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["docs", "docs/a", "docs/a/report.pdf", "docs/notes.txt", "index.html", "media"]
        );
        assert!(manifest.generated_at.is_some());
        assert_eq!(manifest.version, None);
    }

    #[test]
    fn test_records_sizes_and_times() {
        let temp = create_test_tree();
        let manifest = JwalkScanner::new().scan(&config(temp.path())).unwrap();

        let notes = manifest.files.iter().find(|e| e.path == "docs/notes.txt").unwrap();
        assert!(!notes.is_dir);
        assert_eq!(notes.size, 5);
        assert!(notes.mtime_millis().unwrap() > 0);

        let docs = manifest.files.iter().find(|e| e.path == "docs").unwrap();
        assert!(docs.is_dir);
        assert_eq!(docs.size, 0);
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp = create_test_tree();
        let err = JwalkScanner::new()
            .scan(&config(&temp.path().join("index.html")))
            .unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));

        let err = JwalkScanner::new()
            .scan(&config(&temp.path().join("missing")))
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_relative_path() {
        let root = Path::new("/srv/site");
        assert_eq!(
            relative_path(root, Path::new("/srv/site/a/b.txt")).as_deref(),
            Some("a/b.txt")
        );
        assert_eq!(relative_path(root, root), None);
        assert_eq!(relative_path(root, Path::new("/elsewhere")), None);
    }
}
