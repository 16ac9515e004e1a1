//! Selection movement over the visible rows.
//!
//! Every movement clamps to the row range; nothing wraps.

use serde::{Deserialize, Serialize};

/// Number of rows to move on Page Up/Down.
pub const PAGE_SIZE: usize = 10;

/// Columns used when switching to a grid without a remembered width.
pub const GRID_COLUMNS: usize = 4;

/// How rows are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Layout {
    /// One row per line.
    #[default]
    List,
    /// Rows wrapped into a fixed number of columns.
    Grid { columns: usize },
}

impl Layout {
    /// A grid layout. Zero columns is treated as one.
    pub fn grid(columns: usize) -> Self {
        Self::Grid {
            columns: columns.max(1),
        }
    }

    /// Rows skipped by a vertical step.
    pub fn vertical_step(self) -> usize {
        match self {
            Self::List => 1,
            Self::Grid { columns } => columns.max(1),
        }
    }
}

/// A requested cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
}

/// Trait for types that support list-style navigation.
pub trait ListNavigator {
    /// Get the currently selected index.
    fn selected(&self) -> Option<usize>;

    /// Set the selected index.
    fn set_selected(&mut self, index: Option<usize>);

    /// Number of rows.
    fn len(&self) -> usize;

    /// Whether there are no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows moved by Page Up/Down.
    fn page_size(&self) -> usize {
        PAGE_SIZE
    }

    /// Move the selection by `delta` rows, clamping into range.
    ///
    /// With nothing selected, counting starts one before the first row.
    fn move_by(&mut self, delta: isize) {
        let len = self.len();
        if len == 0 {
            self.set_selected(None);
            return;
        }
        let current = self.selected().map_or(-1, |i| i as isize);
        let target = current.saturating_add(delta).clamp(0, len as isize - 1);
        self.set_selected(Some(target as usize));
    }

    /// Move selection up by count items.
    fn move_up(&mut self, count: usize) {
        self.move_by(-(count as isize));
    }

    /// Move selection down by count items.
    fn move_down(&mut self, count: usize) {
        self.move_by(count as isize);
    }

    /// Move selection up by one page.
    fn page_up(&mut self) {
        self.move_up(self.page_size());
    }

    /// Move selection down by one page.
    fn page_down(&mut self) {
        self.move_down(self.page_size());
    }

    /// Jump to the first item.
    fn jump_to_top(&mut self) {
        if !self.is_empty() {
            self.set_selected(Some(0));
        }
    }

    /// Jump to the last item.
    fn jump_to_bottom(&mut self) {
        let len = self.len();
        if len > 0 {
            self.set_selected(Some(len - 1));
        }
    }

    /// Apply a movement under a layout.
    fn apply(&mut self, movement: Movement, layout: Layout) {
        match (movement, layout) {
            (Movement::Up, _) => self.move_up(layout.vertical_step()),
            (Movement::Down, _) => self.move_down(layout.vertical_step()),
            (Movement::Left, Layout::Grid { .. }) => self.move_up(1),
            (Movement::Right, Layout::Grid { .. }) => self.move_down(1),
            (Movement::Left | Movement::Right, Layout::List) => {}
            (Movement::PageUp, _) => self.page_up(),
            (Movement::PageDown, _) => self.page_down(),
            (Movement::Home, _) => self.jump_to_top(),
            (Movement::End, _) => self.jump_to_bottom(),
        }
    }
}

/// Cursor over a row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    selected: Option<usize>,
    len: usize,
    page: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(None, 0)
    }
}

impl Cursor {
    /// Create a cursor over `len` rows, keeping `selected` only if it fits.
    pub fn new(selected: Option<usize>, len: usize) -> Self {
        Self {
            selected: selected.filter(|&i| i < len),
            len,
            page: PAGE_SIZE,
        }
    }

    /// Override the page size. Zero is treated as one.
    pub fn with_page_size(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }
}

impl ListNavigator for Cursor {
    fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn set_selected(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.len);
    }

    fn len(&self) -> usize {
        self.len
    }

    fn page_size(&self) -> usize {
        self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_moves() {
        let mut cursor = Cursor::new(None, 10);
        cursor.move_down(1);
        assert_eq!(cursor.selected(), Some(0));

        cursor.move_down(3);
        assert_eq!(cursor.selected(), Some(3));

        cursor.move_up(1);
        assert_eq!(cursor.selected(), Some(2));

        cursor.jump_to_bottom();
        assert_eq!(cursor.selected(), Some(9));

        cursor.jump_to_top();
        assert_eq!(cursor.selected(), Some(0));
    }

    #[test]
    fn test_cursor_bounds() {
        let mut cursor = Cursor::new(None, 5);
        cursor.move_up(10);
        assert_eq!(cursor.selected(), Some(0));

        cursor.move_down(100);
        assert_eq!(cursor.selected(), Some(4));

        let mut cursor = Cursor::new(None, 5);
        cursor.move_up(1);
        assert_eq!(cursor.selected(), Some(0));
    }

    #[test]
    fn test_cursor_empty() {
        let mut cursor = Cursor::new(Some(3), 0);
        assert_eq!(cursor.selected(), None);
        cursor.move_down(1);
        assert_eq!(cursor.selected(), None);
        cursor.jump_to_bottom();
        assert_eq!(cursor.selected(), None);
    }

    #[test]
    fn test_grid_movement() {
        let layout = Layout::grid(4);
        let mut cursor = Cursor::new(Some(5), 10);

        cursor.apply(Movement::Down, layout);
        assert_eq!(cursor.selected(), Some(9));
        cursor.apply(Movement::Down, layout);
        assert_eq!(cursor.selected(), Some(9));
        cursor.apply(Movement::Up, layout);
        assert_eq!(cursor.selected(), Some(5));
        cursor.apply(Movement::Left, layout);
        assert_eq!(cursor.selected(), Some(4));
        cursor.apply(Movement::Right, layout);
        assert_eq!(cursor.selected(), Some(5));
    }

    #[test]
    fn test_list_ignores_horizontal() {
        let mut cursor = Cursor::new(Some(2), 10);
        cursor.apply(Movement::Left, Layout::List);
        cursor.apply(Movement::Right, Layout::List);
        assert_eq!(cursor.selected(), Some(2));
        cursor.apply(Movement::PageDown, Layout::List);
        assert_eq!(cursor.selected(), Some(9));
        cursor.apply(Movement::PageUp, Layout::List);
        assert_eq!(cursor.selected(), Some(0));
    }

    #[test]
    fn test_custom_page_size() {
        let mut cursor = Cursor::new(Some(0), 50).with_page_size(20);
        cursor.page_down();
        assert_eq!(cursor.selected(), Some(20));
    }

    #[test]
    fn test_zero_columns_is_one() {
        assert_eq!(Layout::grid(0).vertical_step(), 1);
    }
}
