//! The navigation state of a browsing session.

use atlas_core::path::ROOT;
use atlas_query::{SortMode, ViewSpec};
use serde::{Deserialize, Serialize};

/// Everything the user has chosen about what to look at.
///
/// `selection` is derived state: an index into the current visible rows,
/// cleared or reclamped whenever those rows can change. It is not part of
/// the address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Normalized path of the directory being shown.
    pub current_directory: String,
    /// Whether dotfiles are listed.
    pub show_hidden: bool,
    /// Row ordering.
    pub sort_mode: SortMode,
    /// Active search term, empty when not searching.
    pub search_query: String,
    /// Index of the selected row.
    #[serde(skip)]
    pub selection: Option<usize>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_directory: ROOT.to_string(),
            show_hidden: false,
            sort_mode: SortMode::default(),
            search_query: String::new(),
            selection: None,
        }
    }
}

impl NavigationState {
    /// Whether a search is active.
    pub fn is_searching(&self) -> bool {
        !self.search_query.is_empty()
    }

    /// The row query this state describes.
    pub fn view(&self) -> ViewSpec<'_> {
        ViewSpec {
            directory: &self.current_directory,
            query: &self.search_query,
            show_hidden: self.show_hidden,
            sort: self.sort_mode,
            max_depth: None,
        }
    }

    /// Equality ignoring the selection.
    pub fn same_view(&self, other: &Self) -> bool {
        self.current_directory == other.current_directory
            && self.show_hidden == other.show_hidden
            && self.sort_mode == other.sort_mode
            && self.search_query == other.search_query
    }

    /// Copy of the state without a selection.
    pub fn without_selection(&self) -> Self {
        Self {
            selection: None,
            ..self.clone()
        }
    }
}
