//! Slash-separated path arithmetic for the virtual tree.
//!
//! Every path stored in a [`VirtualTree`](crate::VirtualTree) is normalized:
//! exactly one leading `/`, no repeated separators and no trailing separator
//! (except for the root itself). Percent-encoding only happens at the edge,
//! when a path is turned into an external reference.

use std::borrow::Cow;

/// The root marker.
pub const ROOT: &str = "/";

/// Normalize a slash-separated path.
///
/// Collapses repeated separators, forces a single leading separator and
/// strips a trailing one. An empty input yields the root.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in segments(path) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Iterate over the non-empty segments of a path. The root has none.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Number of segments below the root.
pub fn depth(path: &str) -> usize {
    segments(path).count()
}

/// Remove the last segment. The parent of the root is the root.
pub fn parent_of(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(0) | None => ROOT.to_string(),
        Some(idx) => normalized[..idx].to_string(),
    }
}

/// Concatenate parts with separators and normalize the result.
pub fn join<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = parts.into_iter().fold(String::new(), |mut acc, part| {
        acc.push('/');
        acc.push_str(part.as_ref());
        acc
    });
    normalize(&joined)
}

/// Final segment of a path, empty for the root.
pub fn file_name(path: &str) -> &str {
    segments(path).last().unwrap_or("")
}

/// Dotfiles are hidden.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Whether `path` lies strictly below `ancestor`. Both must be normalized.
pub fn is_descendant_of(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return path != ROOT;
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Every prefix of `path` from the root down to the path itself.
///
/// `ancestors("/a/b")` yields `["/", "/a", "/a/b"]`.
pub fn ancestors(path: &str) -> Vec<String> {
    let mut out = vec![ROOT.to_string()];
    let mut acc = String::new();
    for segment in segments(path) {
        acc.push('/');
        acc.push_str(segment);
        out.push(acc.clone());
    }
    out
}

/// Percent-encode each segment independently, keeping the separators.
pub fn encode_for_reference(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.is_empty() {
                Cow::Borrowed("")
            } else {
                urlencoding::encode(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Build an external reference for `path` below `base`.
///
/// An empty base yields a relative reference.
pub fn reference_url(base: &str, path: &str) -> String {
    let relative = encode_for_reference(normalize(path).trim_start_matches('/'));
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        relative
    } else {
        format!("{base}/{relative}")
    }
}
