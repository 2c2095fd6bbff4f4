//! TUI theme
//!
//! Colors for file states, diffs, tabs and the status line, in three
//! palettes picked by terminal color depth.

use ratatui::style::{Color, Modifier, Style};

use super::state::StatusKind;
use crate::git::{Change, ChangeKind};

/// Terminal color capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Basic 16 ANSI colors (maximum compatibility)
    Basic,
    /// 256 color palette
    #[default]
    Indexed,
    /// True color (24-bit RGB)
    TrueColor,
}

impl ColorMode {
    /// Detect the best color mode for the current terminal
    pub fn detect() -> Self {
        Self::from_env(
            std::env::var("COLORTERM").ok().as_deref(),
            std::env::var("TERM").ok().as_deref(),
        )
    }

    fn from_env(colorterm: Option<&str>, term: Option<&str>) -> Self {
        if matches!(colorterm, Some("truecolor" | "24bit")) {
            return Self::TrueColor;
        }
        match term {
            Some(t) if t.contains("kitty") || t.contains("alacritty") => Self::TrueColor,
            Some(t) if t.contains("256color") => Self::Indexed,
            _ => Self::Basic,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub border_focused: Color,
    pub border_unfocused: Color,

    pub selection_bg: Color,
    pub selection_fg: Option<Color>,

    // File states
    pub staged: Color,
    pub unstaged: Color,
    pub untracked: Color,
    pub conflicted: Color,

    pub tab_active: Color,
    pub tab_inactive: Color,

    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_accent: Color,
    /// Commit hashes
    pub text_hash: Color,

    pub diff_added: Color,
    pub diff_removed: Color,
    pub diff_hunk_header: Color,
    pub diff_file_header: Color,

    pub modal_info: Color,
    pub modal_warning: Color,
    pub modal_error: Color,

    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::for_color_mode(ColorMode::detect())
    }
}

impl Theme {
    pub fn for_color_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Basic => Self::basic(),
            ColorMode::Indexed => Self::indexed(),
            ColorMode::TrueColor => Self::truecolor(),
        }
    }

    pub fn basic() -> Self {
        Self {
            border_focused: Color::Cyan,
            border_unfocused: Color::DarkGray,

            selection_bg: Color::Blue,
            selection_fg: Some(Color::White),

            staged: Color::Green,
            unstaged: Color::Yellow,
            untracked: Color::Red,
            conflicted: Color::Magenta,

            tab_active: Color::Cyan,
            tab_inactive: Color::DarkGray,

            text_primary: Color::Reset,
            text_secondary: Color::DarkGray,
            text_accent: Color::Blue,
            text_hash: Color::Yellow,

            diff_added: Color::Green,
            diff_removed: Color::Red,
            diff_hunk_header: Color::Cyan,
            diff_file_header: Color::Yellow,

            modal_info: Color::Cyan,
            modal_warning: Color::Yellow,
            modal_error: Color::Red,

            status_bar_bg: Color::Blue,
            status_bar_fg: Color::White,
        }
    }

    pub fn indexed() -> Self {
        Self {
            border_focused: Color::Indexed(117),
            border_unfocused: Color::Indexed(243),

            selection_bg: Color::Indexed(60),
            selection_fg: Some(Color::Indexed(255)),

            staged: Color::Indexed(156),     // mint
            unstaged: Color::Indexed(222),   // peach
            untracked: Color::Indexed(210),  // coral
            conflicted: Color::Indexed(183), // orchid

            tab_active: Color::Indexed(117),
            tab_inactive: Color::Indexed(245),

            text_primary: Color::Reset,
            text_secondary: Color::Indexed(250),
            text_accent: Color::Indexed(147),
            text_hash: Color::Indexed(223),

            diff_added: Color::Indexed(156),
            diff_removed: Color::Indexed(210),
            diff_hunk_header: Color::Indexed(183),
            diff_file_header: Color::Indexed(223),

            modal_info: Color::Indexed(117),
            modal_warning: Color::Indexed(222),
            modal_error: Color::Indexed(210),

            status_bar_bg: Color::Indexed(236),
            status_bar_fg: Color::Indexed(252),
        }
    }

    pub fn truecolor() -> Self {
        Self {
            border_focused: Color::Rgb(137, 180, 250),
            border_unfocused: Color::Rgb(88, 91, 112),

            selection_bg: Color::Rgb(69, 71, 90),
            selection_fg: Some(Color::Rgb(245, 245, 250)),

            staged: Color::Rgb(166, 227, 161),
            unstaged: Color::Rgb(249, 226, 175),
            untracked: Color::Rgb(243, 139, 168),
            conflicted: Color::Rgb(203, 166, 247),

            tab_active: Color::Rgb(137, 180, 250),
            tab_inactive: Color::Rgb(147, 153, 178),

            text_primary: Color::Rgb(245, 245, 250),
            text_secondary: Color::Rgb(166, 173, 200),
            text_accent: Color::Rgb(180, 190, 254),
            text_hash: Color::Rgb(249, 226, 175),

            diff_added: Color::Rgb(166, 227, 161),
            diff_removed: Color::Rgb(243, 139, 168),
            diff_hunk_header: Color::Rgb(203, 166, 247),
            diff_file_header: Color::Rgb(249, 226, 175),

            modal_info: Color::Rgb(137, 180, 250),
            modal_warning: Color::Rgb(249, 226, 175),
            modal_error: Color::Rgb(243, 139, 168),

            status_bar_bg: Color::Rgb(49, 50, 68),
            status_bar_fg: Color::Rgb(205, 214, 244),
        }
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn border_unfocused(&self) -> Style {
        Style::default().fg(self.border_unfocused)
    }

    pub fn selection(&self) -> Style {
        let style = Style::default().bg(self.selection_bg);
        match self.selection_fg {
            Some(fg) => style.fg(fg),
            None => style,
        }
    }

    pub fn status_bar(&self) -> Style {
        Style::default().bg(self.status_bar_bg).fg(self.status_bar_fg)
    }

    pub fn secondary(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    pub fn hash(&self) -> Style {
        Style::default().fg(self.text_hash)
    }

    pub fn tab(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.tab_active)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(self.tab_inactive)
        }
    }

    /// Color for a file row: fully staged, has worktree edits, untracked
    /// or conflicted
    pub fn change(&self, change: &Change) -> Style {
        let color = match change.kind {
            ChangeKind::Conflicted => self.conflicted,
            ChangeKind::Untracked => self.untracked,
            _ if change.code.worktree == ' ' => self.staged,
            _ => self.unstaged,
        };
        Style::default().fg(color)
    }

    /// Style of the status line text
    pub fn status(&self, kind: StatusKind) -> Style {
        let base = self.status_bar();
        match kind {
            StatusKind::Info => base,
            StatusKind::Warning | StatusKind::Confirm => {
                base.fg(self.modal_warning).add_modifier(Modifier::BOLD)
            }
            StatusKind::Error => base.fg(self.modal_error).add_modifier(Modifier::BOLD),
        }
    }
}
