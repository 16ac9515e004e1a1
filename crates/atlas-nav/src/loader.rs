//! One-shot manifest loading.

use std::path::Path;

use atlas_core::{Manifest, ManifestError};

/// Default manifest file name next to the collection.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Read and parse a manifest file.
pub async fn load_manifest(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ManifestError::io(path, e))?;
    let manifest = Manifest::from_json_str(&text)?;
    tracing::debug!(
        path = %path.display(),
        entries = manifest.len(),
        version = manifest.version.as_deref().unwrap_or("-"),
        "loaded manifest"
    );
    Ok(manifest)
}

/// Read a manifest from standard input.
pub async fn load_manifest_stdin() -> Result<Manifest, ManifestError> {
    use tokio::io::AsyncReadExt;

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .map_err(|e| ManifestError::io("<stdin>", e))?;
    Manifest::from_json_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, r#"{"version": "abc", "files": [{"path": "a.txt", "size": 1}]}"#)
            .unwrap();

        let manifest = load_manifest(&path).await.unwrap();
        assert_eq!(manifest.version.as_deref(), Some("abc"));
        assert_eq!(manifest.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }

    #[tokio::test]
    async fn test_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "[1, 2").unwrap();
        let err = load_manifest(&path).await.unwrap_err();
        assert!(matches!(err, ManifestError::Json(_)));
    }
}
