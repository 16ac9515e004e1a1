//! File and directory node types.

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::path::ROOT;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "avif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogv", "mov", "m4v"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "flac", "aac"];
const PDF_EXTENSIONS: &[&str] = &["pdf"];
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "json", "yml", "yaml", "xml", "csv", "tsv", "ini", "cfg", "env",
    "gitignore", "log", "html", "htm", "css", "js", "ts", "jsx", "tsx", "py", "rb", "rs", "go",
    "java", "kt", "c", "h", "cpp", "hpp", "cs", "php", "sh", "bash", "zsh", "fish", "r", "m", "mm",
    "swift", "lua", "sql", "pl", "scala", "toml",
];

/// Display category of a node.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    IntoStaticStr,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[strum(serialize = "dir")]
    #[serde(rename = "dir")]
    Directory,
    Image,
    Video,
    Audio,
    Pdf,
    Text,
    /// Anything without a known extension.
    #[strum(serialize = "file")]
    #[serde(rename = "file")]
    Generic,
}

impl FileKind {
    /// Classify a node by directory-ness and the extension of its name.
    pub fn classify(name: &str, is_dir: bool) -> Self {
        if is_dir {
            return Self::Directory;
        }
        let Some(ext) = extension(name) else {
            return Self::Generic;
        };
        let table: [(&[&str], FileKind); 5] = [
            (IMAGE_EXTENSIONS, Self::Image),
            (VIDEO_EXTENSIONS, Self::Video),
            (AUDIO_EXTENSIONS, Self::Audio),
            (PDF_EXTENSIONS, Self::Pdf),
            (TEXT_EXTENSIONS, Self::Text),
        ];
        table
            .into_iter()
            .find(|(exts, _)| exts.contains(&ext.as_str()))
            .map_or(Self::Generic, |(_, kind)| kind)
    }

    /// Whether content of this kind is shown inline as text.
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Text)
    }

    /// Whether a preview is rendered from a reference alone.
    pub fn is_media(self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::Audio | Self::Pdf)
    }
}

/// Lowercased extension of a name. A name that only starts with a dot has none.
pub fn extension(name: &str) -> Option<String> {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => Some(name[idx + 1..].to_lowercase()),
        _ => None,
    }
}

/// A single file or directory in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Final path segment, empty for the root.
    pub name: CompactString,

    /// Normalized absolute path.
    pub path: String,

    /// Whether this node is a directory.
    pub is_dir: bool,

    /// Size in bytes (0 for directories).
    pub size: u64,

    /// Modification time in epoch milliseconds.
    pub mtime: Option<i64>,

    /// Cosmetic display label from a rename draft. Never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<CompactString>,

    /// Children keyed by segment name, in insertion order.
    #[serde(default)]
    pub children: IndexMap<CompactString, Node>,
}

impl Node {
    /// Create the root node.
    pub fn root() -> Self {
        Self::new_directory("", ROOT)
    }

    /// Create a directory node with no metadata.
    pub fn new_directory(name: impl Into<CompactString>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: true,
            size: 0,
            mtime: None,
            label: None,
            children: IndexMap::new(),
        }
    }

    /// Create a file node.
    pub fn new_file(
        name: impl Into<CompactString>,
        path: impl Into<String>,
        size: u64,
        mtime: Option<i64>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: false,
            size,
            mtime,
            label: None,
            children: IndexMap::new(),
        }
    }

    /// Derived display category.
    pub fn kind(&self) -> FileKind {
        FileKind::classify(&self.name, self.is_dir)
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// Check if this is the root node.
    pub fn is_root(&self) -> bool {
        self.path == ROOT
    }

    /// Check if the node's own name marks it hidden.
    pub fn is_hidden(&self) -> bool {
        crate::path::is_hidden(&self.name)
    }

    /// Name shown to the user: the rename draft if any, otherwise the name.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(self.name.as_str())
    }

    /// Look up a direct child by segment.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Count every node below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .values()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Path of a child with the given segment name.
    pub fn child_path(&self, name: &str) -> String {
        if self.is_root() {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(FileKind::classify("photo.JPG", false), FileKind::Image);
        assert_eq!(FileKind::classify("clip.webm", false), FileKind::Video);
        assert_eq!(FileKind::classify("song.flac", false), FileKind::Audio);
        assert_eq!(FileKind::classify("paper.pdf", false), FileKind::Pdf);
        assert_eq!(FileKind::classify("main.rs", false), FileKind::Text);
        assert_eq!(FileKind::classify("archive.tar.gz", false), FileKind::Generic);
        assert_eq!(FileKind::classify("Makefile", false), FileKind::Generic);
        assert_eq!(FileKind::classify(".env", false), FileKind::Generic);
        assert_eq!(FileKind::classify("photos.png", true), FileKind::Directory);
    }

    #[test]
    fn test_kind_tokens() {
        assert_eq!(FileKind::Directory.to_string(), "dir");
        assert_eq!(FileKind::Generic.as_ref(), "file");
        assert_eq!("pdf".parse::<FileKind>().unwrap(), FileKind::Pdf);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("a.TXT").as_deref(), Some("txt"));
        assert_eq!(extension(".gitignore"), None);
        assert_eq!(extension("trailing."), None);
        assert_eq!(extension("noext"), None);
    }

    #[test]
    fn test_kind_follows_is_dir() {
        let mut node = Node::new_directory("notes.md", "/notes.md");
        assert_eq!(node.kind(), FileKind::Directory);
        node.is_dir = false;
        assert_eq!(node.kind(), FileKind::Text);
    }

    #[test]
    fn test_child_path_and_counts() {
        let mut root = Node::root();
        let mut dir = Node::new_directory("a", root.child_path("a"));
        let file = Node::new_file("b.txt", dir.child_path("b.txt"), 10, None);
        assert_eq!(file.path, "/a/b.txt");
        dir.children.insert(file.name.clone(), file);
        root.children.insert(dir.name.clone(), dir);

        assert_eq!(root.child_count(), 1);
        assert_eq!(root.descendant_count(), 2);
        assert!(root.is_root());
    }

    #[test]
    fn test_display_name() {
        let mut node = Node::new_file("a.txt", "/a.txt", 1, None);
        assert_eq!(node.display_name(), "a.txt");
        node.label = Some("renamed.txt".into());
        assert_eq!(node.display_name(), "renamed.txt");
        assert_eq!(node.kind(), FileKind::Text);
    }
}
