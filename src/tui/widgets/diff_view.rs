//! Diff view widget
//!
//! Displays unified diff text with highlighting for added/removed lines.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Diff view widget
pub struct DiffView<'a> {
    diff: &'a str,
    theme: &'a Theme,
    block: Option<Block<'a>>,
    /// First line shown
    scroll: usize,
    /// Text shown when `diff` is empty
    placeholder: &'a str,
}

impl<'a> DiffView<'a> {
    pub fn new(diff: &'a str, theme: &'a Theme) -> Self {
        Self {
            diff,
            theme,
            block: None,
            scroll: 0,
            placeholder: "No changes",
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Style a single diff line
    fn style_line(&self, line: &'a str) -> Line<'a> {
        let style = if line.starts_with("+++") || line.starts_with("---") {
            Style::default().fg(self.theme.diff_file_header)
        } else if line.starts_with('+') {
            Style::default().fg(self.theme.diff_added)
        } else if line.starts_with('-') {
            Style::default().fg(self.theme.diff_removed)
        } else if line.starts_with("@@") {
            Style::default().fg(self.theme.diff_hunk_header)
        } else if line.starts_with("diff ") || line.starts_with("index ") {
            Style::default()
                .fg(self.theme.diff_file_header)
                .add_modifier(Modifier::BOLD)
        } else {
            return Line::from(Span::raw(line));
        };
        Line::from(Span::styled(line, style))
    }
}

impl Widget for DiffView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_height = match &self.block {
            Some(block) => block.inner(area).height as usize,
            None => area.height as usize,
        };

        let lines: Vec<Line> = if self.diff.trim().is_empty() {
            vec![Line::from(Span::styled(self.placeholder, self.theme.secondary()))]
        } else {
            // Only style the visible window of lines
            self.diff
                .lines()
                .skip(self.scroll)
                .take(inner_height)
                .map(|line| self.style_line(line))
                .collect()
        };

        let paragraph = Paragraph::new(lines);
        let paragraph = match self.block {
            Some(block) => paragraph.block(block),
            None => paragraph,
        };
        paragraph.render(area, buf);
    }
}
