//! Preview requests, staleness tickets and content loading.
//!
//! Every preview request carries a [`PreviewTicket`]. Only content loaded
//! for the most recently issued ticket is accepted, so a slow load for a
//! row the user already left can never replace a newer preview.

use std::fmt;
use std::path::{Path, PathBuf};

use atlas_core::{FileKind, path};
use thiserror::Error;
use tokio::io::AsyncReadExt;

/// Largest text file shown inline (1 MiB).
pub const TEXT_PREVIEW_LIMIT: u64 = 1024 * 1024;

/// Monotonic identifier of a preview request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreviewTicket(u64);

impl PreviewTicket {
    /// Raw ticket number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PreviewTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a front end needs to show a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    /// Normalized path of the file.
    pub path: String,
    /// Display category.
    pub kind: FileKind,
    /// External reference for opening the file.
    pub reference: String,
    /// Staleness ticket.
    pub ticket: PreviewTicket,
}

/// Issues tickets and decides which loaded previews are still wanted.
#[derive(Debug, Clone, Default)]
pub struct PreviewTracker {
    issued: u64,
    pending: Option<PreviewTicket>,
}

impl PreviewTracker {
    /// Create a tracker with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket. It supersedes every earlier one.
    pub fn issue(&mut self) -> PreviewTicket {
        self.issued += 1;
        let ticket = PreviewTicket(self.issued);
        self.pending = Some(ticket);
        ticket
    }

    /// Drop the pending ticket, e.g. after navigating away.
    pub fn invalidate(&mut self) {
        self.pending = None;
    }

    /// Whether `ticket` is the one currently wanted.
    pub fn is_current(&self, ticket: PreviewTicket) -> bool {
        self.pending == Some(ticket)
    }

    /// Accept loaded content for `ticket`. Returns false for stale tickets.
    pub fn accept(&mut self, ticket: PreviewTicket) -> bool {
        if self.is_current(ticket) {
            self.pending = None;
            true
        } else {
            tracing::debug!(%ticket, "discarding stale preview");
            false
        }
    }
}

/// Errors that can occur while loading a preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exceeds the inline text limit.
    #[error("File too large to preview ({size} bytes, limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// Nothing can be shown inline for this kind.
    #[error("No preview available for {kind} files")]
    Unsupported { kind: FileKind },

    /// The request points at a directory.
    #[error("{path} is a directory")]
    IsDirectory { path: String },

    /// The path would escape the content root.
    #[error("{path} lies outside the content root")]
    OutsideRoot { path: String },
}

impl PreviewError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Content ready for display. The open reference is always kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    /// Inline text.
    Text { text: String, reference: String },
    /// Image, video, audio or pdf, shown from the reference alone.
    Media { kind: FileKind, reference: String },
    /// Text that exceeds the limit.
    TooLarge { size: u64, reference: String },
    /// Nothing to show inline.
    Unavailable { message: String, reference: String },
}

impl PreviewContent {
    /// Fold a load result into displayable content.
    pub fn from_result(result: Result<Self, PreviewError>, reference: &str) -> Self {
        match result {
            Ok(content) => content,
            Err(PreviewError::TooLarge { size, .. }) => Self::TooLarge {
                size,
                reference: reference.to_string(),
            },
            Err(err) => Self::Unavailable {
                message: err.to_string(),
                reference: reference.to_string(),
            },
        }
    }

    /// The external reference for opening the file.
    pub fn reference(&self) -> &str {
        match self {
            Self::Text { reference, .. }
            | Self::Media { reference, .. }
            | Self::TooLarge { reference, .. }
            | Self::Unavailable { reference, .. } => reference,
        }
    }

    /// One-line summary for status output.
    pub fn summary(&self) -> String {
        match self {
            Self::Text { text, .. } => format!("{} line(s) of text", text.lines().count()),
            Self::Media { kind, reference } => format!("{kind} preview: {reference}"),
            Self::TooLarge { size, .. } => {
                format!("File too large to preview ({size} bytes). Use open to view.")
            }
            Self::Unavailable { .. } => "Preview unavailable. Use open to view.".to_string(),
        }
    }
}

/// Reads preview content from a local copy of the collection.
#[derive(Debug, Clone)]
pub struct PreviewLoader {
    content_root: PathBuf,
    max_bytes: u64,
}

impl PreviewLoader {
    /// Create a loader reading below `content_root`.
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            max_bytes: TEXT_PREVIEW_LIMIT,
        }
    }

    /// Override the inline text limit.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Root directory previews are read from.
    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Local file backing a tree path.
    pub fn local_path(&self, tree_path: &str) -> Result<PathBuf, PreviewError> {
        let mut local = self.content_root.clone();
        for segment in path::segments(tree_path) {
            if segment == ".." || segment == "." {
                return Err(PreviewError::OutsideRoot {
                    path: tree_path.to_string(),
                });
            }
            local.push(segment);
        }
        Ok(local)
    }

    /// Load content for a request.
    pub async fn load(&self, request: &PreviewRequest) -> Result<PreviewContent, PreviewError> {
        if request.kind == FileKind::Directory {
            return Err(PreviewError::IsDirectory {
                path: request.path.clone(),
            });
        }
        if request.kind.is_media() {
            return Ok(PreviewContent::Media {
                kind: request.kind,
                reference: request.reference.clone(),
            });
        }
        if !request.kind.is_textual() {
            return Err(PreviewError::Unsupported { kind: request.kind });
        }

        let local = self.local_path(&request.path)?;
        let metadata = tokio::fs::metadata(&local)
            .await
            .map_err(|e| PreviewError::io(&local, e))?;
        if metadata.is_dir() {
            return Err(PreviewError::IsDirectory {
                path: request.path.clone(),
            });
        }
        if metadata.len() > self.max_bytes {
            return Err(PreviewError::TooLarge {
                size: metadata.len(),
                limit: self.max_bytes,
            });
        }

        let file = tokio::fs::File::open(&local)
            .await
            .map_err(|e| PreviewError::io(&local, e))?;
        let mut bytes = Vec::with_capacity(metadata.len() as usize);
        // The file may grow between stat and read; never take more than the limit.
        file.take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| PreviewError::io(&local, e))?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(PreviewError::TooLarge {
                size: bytes.len() as u64,
                limit: self.max_bytes,
            });
        }

        Ok(PreviewContent::Text {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            reference: request.reference.clone(),
        })
    }

    /// Load content, degrading failures to an inline message.
    pub async fn load_content(&self, request: &PreviewRequest) -> PreviewContent {
        let result = self.load(request).await;
        if let Err(ref err) = result {
            tracing::warn!(path = %request.path, "preview failed: {err}");
        }
        PreviewContent::from_result(result, &request.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_wins() {
        let mut tracker = PreviewTracker::new();
        let first = tracker.issue();
        let second = tracker.issue();
        assert!(first < second);
        assert!(!tracker.accept(first));
        assert!(tracker.accept(second));
        assert!(!tracker.accept(second));
    }

    #[test]
    fn test_invalidate() {
        let mut tracker = PreviewTracker::new();
        let ticket = tracker.issue();
        tracker.invalidate();
        assert!(!tracker.is_current(ticket));
        assert!(!tracker.accept(ticket));
    }

    #[tokio::test]
    async fn test_unbounded_limit_reads_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let loader = PreviewLoader::new(dir.path()).with_max_bytes(u64::MAX);
        let request = PreviewRequest {
            path: "/a.txt".into(),
            kind: FileKind::Text,
            reference: "a.txt".into(),
            ticket: PreviewTracker::new().issue(),
        };
        assert_eq!(
            loader.load(&request).await.unwrap(),
            PreviewContent::Text {
                text: "hello".into(),
                reference: "a.txt".into()
            }
        );
    }

    #[test]
    fn test_local_path_rejects_parent_segments() {
        let loader = PreviewLoader::new("/srv/site");
        assert_eq!(
            loader.local_path("/docs/a.txt").unwrap(),
            PathBuf::from("/srv/site/docs/a.txt")
        );
        assert!(matches!(
            loader.local_path("/docs/../../etc/passwd"),
            Err(PreviewError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn test_from_result_keeps_reference() {
        let content = PreviewContent::from_result(
            Err(PreviewError::Unsupported {
                kind: FileKind::Generic,
            }),
            "docs/a.bin",
        );
        assert_eq!(content.reference(), "docs/a.bin");
        assert!(matches!(content, PreviewContent::Unavailable { .. }));

        let content = PreviewContent::from_result(
            Err(PreviewError::TooLarge { size: 10, limit: 5 }),
            "big.txt",
        );
        assert_eq!(content, PreviewContent::TooLarge { size: 10, reference: "big.txt".into() });
    }
}
