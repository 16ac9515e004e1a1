//! Manifest document types.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// One record of the flat manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Slash-separated path, with or without a leading slash.
    pub path: String,

    /// Whether this record describes a directory.
    #[serde(default)]
    pub is_dir: bool,

    /// Size in bytes, meaningful for files only.
    #[serde(default)]
    pub size: u64,

    /// Modification time in epoch milliseconds. Generators may emit a
    /// fractional value.
    #[serde(default)]
    pub mtime: Option<f64>,
}

impl ManifestEntry {
    /// Create a file record.
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            size,
            mtime: None,
        }
    }

    /// Create a directory record.
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            size: 0,
            mtime: None,
        }
    }

    /// Attach a modification time.
    pub fn with_mtime(mut self, mtime: i64) -> Self {
        self.mtime = Some(mtime as f64);
        self
    }

    /// Modification time truncated to whole milliseconds.
    pub fn mtime_millis(&self) -> Option<i64> {
        self.mtime.filter(|m| m.is_finite()).map(|m| m as i64)
    }
}

/// The manifest document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Opaque version string (usually a commit id).
    #[serde(default)]
    pub version: Option<String>,

    /// When the manifest was generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,

    /// All records, in generation order.
    #[serde(default)]
    pub files: Vec<ManifestEntry>,
}

impl Manifest {
    /// Create a manifest from records.
    pub fn new(files: Vec<ManifestEntry>) -> Self {
        Self {
            version: None,
            generated_at: None,
            files,
        }
    }

    /// Parse a manifest from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(text).map_err(ManifestError::Json)
    }

    /// Parse a manifest from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, ManifestError> {
        serde_json::from_reader(reader).map_err(ManifestError::Json)
    }

    /// Serialize the manifest as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Json)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Short form of the version for display (first 7 characters).
    pub fn short_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .map(|v| v.char_indices().nth(7).map_or(v, |(idx, _)| &v[..idx]))
    }
}
