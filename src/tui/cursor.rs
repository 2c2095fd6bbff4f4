//! Cursor and scroll-offset pairs for list views
//!
//! Every list owns a [`ListCursor`]. After each move the offset is adjusted
//! so the selected row stays inside the visible window.

use super::event::Nav;

/// Rows taken by the tab bar, status header, footer and borders
pub const UI_OVERHEAD: u16 = 9;

/// Extra chrome around the workspace file list (diff preview header, legend)
pub const FILE_LIST_CHROME: u16 = 7;

/// Extra chrome around every other list
pub const LIST_CHROME: u16 = 4;

/// Rows a list can show in a terminal `height` rows tall; never below 1
pub fn visible_rows(height: u16, chrome: u16) -> usize {
    height.saturating_sub(UI_OVERHEAD + chrome).max(1) as usize
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    pub selected: usize,
    pub offset: usize,
}

impl ListCursor {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn up(&mut self, visible: usize) {
        self.selected = self.selected.saturating_sub(1);
        self.adjust(visible);
    }

    pub fn down(&mut self, len: usize, visible: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
        self.adjust(visible);
    }

    /// Apply a navigation step; returns whether the selection changed
    pub fn navigate(&mut self, nav: Nav, len: usize, visible: usize) -> bool {
        let before = self.selected;
        match nav {
            Nav::Up => self.up(visible),
            Nav::Down => self.down(len, visible),
            Nav::PageUp => {
                self.selected = self.selected.saturating_sub(visible.max(1));
                self.adjust(visible);
            }
            Nav::PageDown => {
                self.selected = (self.selected + visible.max(1)).min(len.saturating_sub(1));
                self.adjust(visible);
            }
        }
        self.selected != before
    }

    /// Pull the cursor back inside a list that may have shrunk
    pub fn clamp(&mut self, len: usize, visible: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        self.adjust(visible);
    }

    /// Move the offset so `selected` is inside `[offset, offset + visible)`
    pub fn adjust(&mut self, visible: usize) {
        let visible = visible.max(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + visible {
            self.offset = self.selected + 1 - visible;
        }
    }

    /// Index range of the rows currently on screen
    pub fn window(&self, len: usize, visible: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(len);
        start..(start + visible.max(1)).min(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_visible_rows_floor() {
        assert_eq!(visible_rows(40, FILE_LIST_CHROME), 24);
        assert_eq!(visible_rows(40, LIST_CHROME), 27);
        assert_eq!(visible_rows(5, LIST_CHROME), 1);
        assert_eq!(visible_rows(0, FILE_LIST_CHROME), 1);
    }

    #[test]
    fn test_scrolls_to_keep_cursor_visible() {
        let mut cursor = ListCursor::default();
        for _ in 0..5 {
            cursor.down(10, 3);
        }
        assert_eq!(cursor, ListCursor { selected: 5, offset: 3 });

        for _ in 0..4 {
            cursor.up(3);
        }
        assert_eq!(cursor, ListCursor { selected: 1, offset: 1 });
    }

    #[test]
    fn test_down_stops_at_end() {
        let mut cursor = ListCursor::default();
        cursor.down(1, 5);
        assert_eq!(cursor.selected, 0);
        cursor.down(0, 5);
        assert_eq!(cursor.selected, 0);
    }

    #[test]
    fn test_page_navigation() {
        let mut cursor = ListCursor::default();
        assert!(cursor.navigate(Nav::PageDown, 20, 5));
        assert_eq!(cursor.selected, 5);
        cursor.navigate(Nav::PageDown, 7, 5);
        assert_eq!(cursor.selected, 6);
        assert!(!ListCursor::default().navigate(Nav::PageUp, 20, 5));
    }

    #[test]
    fn test_window() {
        let cursor = ListCursor { selected: 4, offset: 3 };
        assert_eq!(cursor.window(10, 3), 3..6);
        assert_eq!(cursor.window(4, 3), 3..4);
    }

    proptest! {
        #[test]
        fn clamp_after_shrink(len in 1usize..200, selected in 0usize..400, new_len in 0usize..200, visible in 0usize..50) {
            let mut cursor = ListCursor { selected: selected.min(len - 1), offset: 0 };
            cursor.adjust(visible);
            cursor.clamp(new_len, visible);
            prop_assert_eq!(cursor.selected, selected.min(len - 1).min(new_len.saturating_sub(1)));
            prop_assert!(cursor.selected >= cursor.offset);
            prop_assert!(cursor.selected < cursor.offset + visible.max(1));
        }

        #[test]
        fn moves_keep_cursor_in_window(moves in proptest::collection::vec(any::<bool>(), 0..100), len in 1usize..60, visible in 1usize..20) {
            let mut cursor = ListCursor::default();
            for down in moves {
                if down { cursor.down(len, visible) } else { cursor.up(visible) }
                prop_assert!(cursor.selected < len);
                prop_assert!(cursor.offset <= cursor.selected);
                prop_assert!(cursor.selected < cursor.offset + visible);
            }
        }
    }
}
