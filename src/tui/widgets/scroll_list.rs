//! List widget whose selection and scroll come from a [`ListCursor`]

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, StatefulWidget, Widget},
};

use crate::tui::cursor::ListCursor;
use crate::tui::theme::Theme;

pub struct ScrollList<'a> {
    rows: Vec<Line<'a>>,
    cursor: ListCursor,
    block: Option<Block<'a>>,
    highlight_style: Style,
    empty: &'a str,
    theme: &'a Theme,
}

impl<'a> ScrollList<'a> {
    pub fn new(rows: Vec<Line<'a>>, cursor: ListCursor, theme: &'a Theme) -> Self {
        Self {
            rows,
            cursor,
            block: None,
            highlight_style: theme.selection().add_modifier(Modifier::BOLD),
            empty: "Nothing to show",
            theme,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Text shown when there are no rows
    pub fn empty(mut self, text: &'a str) -> Self {
        self.empty = text;
        self
    }
}

impl Widget for ScrollList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.rows.is_empty() {
            let list = List::new(vec![ListItem::new(Span::styled(
                self.empty,
                self.theme.secondary(),
            ))]);
            let list = match self.block {
                Some(block) => list.block(block),
                None => list,
            };
            Widget::render(list, area, buf);
            return;
        }

        let mut state = ListState::default()
            .with_offset(self.cursor.offset)
            .with_selected(Some(self.cursor.selected));
        let items: Vec<ListItem> = self.rows.into_iter().map(ListItem::new).collect();
        let list = List::new(items).highlight_style(self.highlight_style);
        let list = match self.block {
            Some(block) => list.block(block),
            None => list,
        };
        StatefulWidget::render(list, area, buf, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_renders_from_offset() {
        let theme = Theme::basic();
        let rows = (0..10).map(|i| Line::from(format!("row {i}"))).collect();
        let cursor = ListCursor { selected: 5, offset: 4 };
        let area = Rect::new(0, 0, 12, 3);
        let mut buf = Buffer::empty(area);
        ScrollList::new(rows, cursor, &theme).render(area, &mut buf);
        assert!(row(&buf, 0).starts_with("row 4"));
        assert_eq!(buf[(0, 1)].bg, theme.selection_bg);
    }

    #[test]
    fn test_empty_text() {
        let theme = Theme::basic();
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        ScrollList::new(Vec::new(), ListCursor::default(), &theme)
            .empty("No stashes")
            .render(area, &mut buf);
        assert!(row(&buf, 0).starts_with("No stashes"));
    }
}
