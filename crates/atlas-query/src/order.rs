//! Deterministic row ordering.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use atlas_core::Node;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, FromRepr, IntoEnumIterator, IntoStaticStr};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Attribute a [`SortMode`] orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SortKey {
    Name,
    Size,
    Date,
    Type,
}

/// Sort mode for listings and search results.
///
/// The string form (`name-asc`, `size-desc`, ...) is the token used in
/// addresses and settings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    AsRefStr,
    IntoStaticStr,
    EnumString,
    EnumIter,
    FromRepr,
    Serialize,
    Deserialize,
)]
pub enum SortMode {
    /// Name A-Z.
    #[default]
    #[strum(serialize = "name-asc")]
    #[serde(rename = "name-asc")]
    NameAscending,
    /// Name Z-A.
    #[strum(serialize = "name-desc")]
    #[serde(rename = "name-desc")]
    NameDescending,
    /// Smallest first.
    #[strum(serialize = "size-asc")]
    #[serde(rename = "size-asc")]
    SizeAscending,
    /// Largest first.
    #[strum(serialize = "size-desc")]
    #[serde(rename = "size-desc")]
    SizeDescending,
    /// Oldest first.
    #[strum(serialize = "date-asc")]
    #[serde(rename = "date-asc")]
    DateAscending,
    /// Newest first.
    #[strum(serialize = "date-desc")]
    #[serde(rename = "date-desc")]
    DateDescending,
    /// Kind A-Z.
    #[strum(serialize = "type-asc")]
    #[serde(rename = "type-asc")]
    TypeAscending,
    /// Kind Z-A.
    #[strum(serialize = "type-desc")]
    #[serde(rename = "type-desc")]
    TypeDescending,
}

impl SortMode {
    /// Build a mode from its key and direction.
    pub fn from_parts(key: SortKey, descending: bool) -> Self {
        match (key, descending) {
            (SortKey::Name, false) => Self::NameAscending,
            (SortKey::Name, true) => Self::NameDescending,
            (SortKey::Size, false) => Self::SizeAscending,
            (SortKey::Size, true) => Self::SizeDescending,
            (SortKey::Date, false) => Self::DateAscending,
            (SortKey::Date, true) => Self::DateDescending,
            (SortKey::Type, false) => Self::TypeAscending,
            (SortKey::Type, true) => Self::TypeDescending,
        }
    }

    /// Parse a token, falling back to the default for anything unknown.
    pub fn from_token_or_default(token: &str) -> Self {
        token.parse().unwrap_or_default()
    }

    /// The attribute this mode orders by.
    pub fn key(self) -> SortKey {
        match self {
            Self::NameAscending | Self::NameDescending => SortKey::Name,
            Self::SizeAscending | Self::SizeDescending => SortKey::Size,
            Self::DateAscending | Self::DateDescending => SortKey::Date,
            Self::TypeAscending | Self::TypeDescending => SortKey::Type,
        }
    }

    /// Whether the mode's key is reversed.
    pub fn is_descending(self) -> bool {
        matches!(
            self,
            Self::NameDescending | Self::SizeDescending | Self::DateDescending | Self::TypeDescending
        )
    }

    /// Cycle to the next sort mode.
    pub fn next(self) -> Self {
        let current = self as usize;
        let next = (current + 1) % Self::iter().count();
        Self::from_repr(next).unwrap_or_default()
    }

    /// Reverse the current sort direction.
    pub fn reverse(self) -> Self {
        Self::from_parts(self.key(), !self.is_descending())
    }

    /// Get a short label for display in the status line.
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::NameAscending => "NM↑",
            Self::NameDescending => "NM↓",
            Self::SizeAscending => "SZ↑",
            Self::SizeDescending => "SZ↓",
            Self::DateAscending => "DT↑",
            Self::DateDescending => "DT↓",
            Self::TypeAscending => "TY↑",
            Self::TypeDescending => "TY↓",
        }
    }

    /// Compare two rows under this mode.
    ///
    /// Directories come first. Then the mode's key (reversed when
    /// descending), then the name in natural order, then the raw name and
    /// finally the path, so only a node compared with itself is `Equal`.
    pub fn compare(self, a: &Node, b: &Node) -> Ordering {
        let descending = self.is_descending();
        let directed = |ord: Ordering| if descending { ord.reverse() } else { ord };

        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| match self.key() {
                SortKey::Name => Ordering::Equal,
                SortKey::Size => directed(a.size.cmp(&b.size)),
                SortKey::Date => directed(a.mtime.unwrap_or(0).cmp(&b.mtime.unwrap_or(0))),
                SortKey::Type => directed(kind_token(a).cmp(kind_token(b))),
            })
            .then_with(|| {
                let by_name = natural_cmp(&a.name, &b.name);
                if self.key() == SortKey::Name {
                    directed(by_name)
                } else {
                    by_name
                }
            })
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.path.cmp(&b.path))
    }
}

/// Sort rows in place.
pub fn sort_nodes(nodes: &mut [&Node], mode: SortMode) {
    nodes.sort_by(|a, b| mode.compare(a, b));
}

/// Case- and accent-insensitive comparison where digit runs compare by value.
///
/// `file2` sorts before `file10`, `É` equals `e`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = fold(a);
    let b = fold(b);
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ord = cmp_digit_runs(&take_digits(&mut left), &take_digits(&mut right));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn kind_token(node: &Node) -> &'static str {
    node.kind().into()
}

/// Decompose, drop combining marks and lowercase.
fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        run.push(c);
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
