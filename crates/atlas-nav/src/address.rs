//! Query-string form of a [`NavigationState`].
//!
//! Four keys carry the state: `path`, `hidden`, `sort` and `q`. A key whose
//! value equals its default is left out. Keys the session does not own are
//! kept in place when the state is written back.

use std::fmt;

use atlas_core::path::{self, ROOT};
use atlas_query::SortMode;
use indexmap::IndexMap;

use crate::state::NavigationState;

/// Key holding the current directory.
pub const PATH_KEY: &str = "path";
/// Key holding `1` when hidden rows are shown.
pub const HIDDEN_KEY: &str = "hidden";
/// Key holding the sort token.
pub const SORT_KEY: &str = "sort";
/// Key holding the search term.
pub const QUERY_KEY: &str = "q";

/// A parsed address: an optional prefix, the query parameters and an
/// optional fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    base: String,
    params: IndexMap<String, String>,
    fragment: Option<String>,
}

impl Address {
    /// Parse an address. Accepts a full URL, a bare `?query` or a query
    /// without the leading `?`.
    ///
    /// When a key repeats, the first value wins.
    pub fn parse(input: &str) -> Self {
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (input, None),
        };
        let (base, query) = match rest.split_once('?') {
            Some((base, query)) => (base, query),
            None if rest.contains('=') => ("", rest),
            None => (rest, ""),
        };

        let mut params = IndexMap::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.entry(decode(key)).or_insert_with(|| decode(value));
        }

        Self {
            base: base.to_string(),
            params,
            fragment,
        }
    }

    /// Value of a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Set a parameter, keeping its position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Remove a parameter, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.shift_remove(key)
    }

    /// Iterate over all parameters in order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The encoded query, without the leading `?`.
    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Read a navigation state. Missing or malformed keys take their
    /// defaults; an unknown sort token means the default order.
    ///
    /// The path is only normalized here. Whether it exists is for the
    /// session to decide.
    pub fn restore(&self) -> NavigationState {
        NavigationState {
            current_directory: path::normalize(self.get(PATH_KEY).unwrap_or(ROOT)),
            show_hidden: self.get(HIDDEN_KEY) == Some("1"),
            sort_mode: self
                .get(SORT_KEY)
                .map(SortMode::from_token_or_default)
                .unwrap_or_default(),
            search_query: self.get(QUERY_KEY).unwrap_or_default().trim().to_string(),
            selection: None,
        }
    }

    /// Write the state's keys, dropping those at their default.
    pub fn apply_state(&mut self, state: &NavigationState) {
        let directory = path::normalize(&state.current_directory);
        self.set_or_remove(PATH_KEY, (directory != ROOT).then_some(directory));
        self.set_or_remove(HIDDEN_KEY, state.show_hidden.then(|| "1".to_string()));
        self.set_or_remove(
            SORT_KEY,
            (state.sort_mode != SortMode::default()).then(|| state.sort_mode.to_string()),
        );
        let query = state.search_query.trim();
        self.set_or_remove(QUERY_KEY, (!query.is_empty()).then(|| query.to_string()));
    }

    /// Builder-style [`apply_state`](Self::apply_state).
    pub fn with_state(mut self, state: &NavigationState) -> Self {
        self.apply_state(state);
        self
    }

    fn set_or_remove(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(value) => self.set(key, value),
            None => {
                self.remove(key);
            }
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        let query = self.query_string();
        if !query.is_empty() {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// Canonical address of a state.
pub fn serialize(state: &NavigationState) -> String {
    Address::default().with_state(state).to_string()
}

/// State described by an address.
pub fn restore(address: &str) -> NavigationState {
    Address::parse(address).restore()
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

/// Percent-encode a value. `/` stays readable; it is legal in a query.
fn encode(raw: &str) -> String {
    urlencoding::encode(raw).replace("%2F", "/")
}
