//! Manifest version detection.

use std::path::Path;

/// Environment variable consulted before git.
pub const VERSION_ENV: &str = "GITHUB_SHA";

/// Detect the collection version: `GITHUB_SHA` if set, otherwise the commit
/// at `HEAD` of the repository containing `root`.
pub fn detect_version(root: &Path) -> Option<String> {
    if let Some(sha) = env_version() {
        return Some(sha);
    }
    head_commit(root)
}

fn env_version() -> Option<String> {
    std::env::var(VERSION_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(feature = "git")]
fn head_commit(root: &Path) -> Option<String> {
    let commit = git2::Repository::discover(root).and_then(|repo| {
        let head = repo.head()?;
        let id = head.peel_to_commit()?.id();
        Ok(id.to_string())
    });

    match commit {
        Ok(id) => Some(id),
        Err(err) => {
            tracing::debug!(root = %root.display(), "no git version: {}", err.message());
            None
        }
    }
}

#[cfg(not(feature = "git"))]
fn head_commit(_root: &Path) -> Option<String> {
    None
}

#[cfg(all(test, feature = "git"))]
mod tests {
    use super::*;

    #[test]
    fn test_outside_repository() {
        let temp = tempfile::tempdir().unwrap();
        assert_eq!(head_commit(temp.path()), None);
    }

    #[test]
    fn test_reads_head_commit() {
        let temp = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(temp.path()).unwrap();
        let sig = git2::Signature::now("atlas", "atlas@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();

        assert_eq!(head_commit(temp.path()), Some(oid.to_string()));
    }
}
