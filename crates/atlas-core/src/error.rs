//! Error and warning types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The manifest could not be read or decoded.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Reading the manifest failed.
    #[error("Cannot read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON of the expected shape.
    #[error("Invalid manifest: {0}")]
    Json(#[source] serde_json::Error),
}

impl ManifestError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that can occur while generating a manifest from disk.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of build warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// The entry's path normalized to the root.
    EmptyPath,
    /// The entry needed a directory where a file already exists.
    Conflict,
    /// A file record replaced a directory that already had children.
    Downgraded,
}

/// Non-fatal problem found while building a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildWarning {
    /// Normalized path of the offending record.
    pub path: String,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl BuildWarning {
    /// Create a new build warning.
    pub fn new(path: impl Into<String>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// An entry whose path is empty after normalization.
    pub fn empty_path(raw: &str) -> Self {
        Self {
            path: "/".to_string(),
            message: format!("Entry path {raw:?} is empty after normalization"),
            kind: WarningKind::EmptyPath,
        }
    }

    /// An entry that would nest below a file.
    pub fn conflict(path: impl Into<String>, blocking_file: &str) -> Self {
        let path = path.into();
        Self {
            message: format!("{path} lies below file {blocking_file}"),
            path,
            kind: WarningKind::Conflict,
        }
    }

    /// A directory turned into a file by its own leaf record.
    pub fn downgraded(path: impl Into<String>, dropped: usize) -> Self {
        let path = path.into();
        Self {
            message: format!("{path} redeclared as a file, {dropped} descendant(s) dropped"),
            path,
            kind: WarningKind::Downgraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_io() {
        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::PermissionDenied { .. }));
    }

    #[test]
    fn test_build_warning_creation() {
        let warning = BuildWarning::conflict("/a/b", "/a");
        assert_eq!(warning.kind, WarningKind::Conflict);
        assert!(warning.message.contains("below file /a"));

        let warning = BuildWarning::downgraded("/x", 3);
        assert_eq!(warning.kind, WarningKind::Downgraded);
        assert!(warning.message.contains("3 descendant"));
    }
}
