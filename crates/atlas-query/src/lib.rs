//! Query and ordering engine for atlas.
//!
//! Turns a directory (or a search scoped to it) into the ordered set of
//! rows a front end displays.

pub mod order;
mod search;

pub use order::{SortKey, SortMode, natural_cmp, sort_nodes};
pub use search::{SearchOptions, ViewSpec, search, search_with, visible_rows};
