//! Persistent user settings.

use std::path::{Path, PathBuf};

use atlas_query::SortMode;
use serde::{Deserialize, Serialize};

use crate::cursor::{Layout, PAGE_SIZE};
use crate::preview::TEXT_PREVIEW_LIMIT;

/// Persistent user settings stored in the config directory.
///
/// They seed a session only when no address is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Show hidden files by default.
    pub show_hidden: bool,
    /// Default row ordering.
    pub default_sort: SortMode,
    /// Grid column count. Unset means a list.
    pub grid_columns: Option<usize>,
    /// Rows moved by Page Up/Down.
    pub page_size: usize,
    /// Largest text file previewed inline.
    pub preview_max_bytes: u64,
    /// Local copy of the collection used for previews.
    pub content_root: Option<PathBuf>,
    /// Prefix for external references. Empty means relative.
    pub reference_base: String,
    /// Quick links listed by the palette.
    pub bookmarks: Vec<Bookmark>,
}

/// A named shortcut to a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub label: String,
    pub path: String,
}

impl Bookmark {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            show_hidden: false,
            default_sort: SortMode::default(),
            grid_columns: None,
            page_size: PAGE_SIZE,
            preview_max_bytes: TEXT_PREVIEW_LIMIT,
            content_root: None,
            reference_base: String::new(),
            bookmarks: Vec::new(),
        }
    }
}

impl UserSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("atlas").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from a specific file. Missing or invalid files yield
    /// defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), "ignoring invalid settings: {err}");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk.
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No config directory")
        })?;
        self.save_to(&path)
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(path, content)
    }

    /// Layout implied by the column setting.
    pub fn layout(&self) -> Layout {
        self.grid_columns.map_or(Layout::List, Layout::grid)
    }
}
