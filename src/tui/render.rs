//! Drawing
//!
//! Pure functions from [`AppState`] to a ratatui frame. Nothing here
//! mutates state; list windows come from the cursors the state keeps.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
};
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState, WhichUse};

use super::cursor::{FILE_LIST_CHROME, visible_rows};
use super::state::{
    AppState, Mode, TOOL_MENU, Tab, ToolMode, UndoSource, WorkspaceView,
};
use super::theme::Theme;
use super::widgets::{DiffView, ScrollList};
use crate::git::{Commit, CommitDetail, Divergence, Status};

/// Draw the whole UI. `busy` is set while commands are in flight.
pub fn render(frame: &mut Frame, state: &AppState, theme: &Theme, busy: Option<&mut ThrobberState>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, state, theme, chunks[0]);
    render_header(frame, state, theme, chunks[1]);
    render_body(frame, state, theme, chunks[2]);
    render_hints(frame, state, theme, chunks[3]);
    render_status_bar(frame, state, theme, chunks[4], busy);

    if let Some(prompt) = &state.prompt {
        let area = centered_rect(60, 20, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(format!(" {} ", prompt.kind.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.modal_warning));
        let text = format!("{}\n\n> {}_", prompt.kind.prompt(), prompt.input.value());
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    if state.show_help {
        render_help(frame, state, theme);
    }
}

fn pane<'a>(title: impl Into<String>, focused: bool, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title.into()))
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.border_focused()
        } else {
            theme.border_unfocused()
        })
}

fn render_tabs(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let active = state.mode.tab();
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            Line::from(Span::styled(
                format!("{} {}", i + 1, tab.title()),
                theme.tab(*tab == active),
            ))
        })
        .collect();
    let selected = Tab::ALL.iter().position(|t| *t == active).unwrap_or(0);
    frame.render_widget(Tabs::new(titles).select(selected).divider(" | "), area);
}

/// `main ↑2 ↓1`, `main [gone]`, or just the branch name
fn tracking_label(branch: &str, ahead: u32, behind: u32, divergence: &Divergence) -> String {
    match divergence {
        Divergence::Gone => format!("{branch} [gone]"),
        Divergence::Unparsed(raw) => format!("{branch} [{raw}]"),
        Divergence::Tracked | Divergence::None => {
            let mut label = branch.to_string();
            if ahead > 0 {
                label.push_str(&format!(" ↑{ahead}"));
            }
            if behind > 0 {
                label.push_str(&format!(" ↓{behind}"));
            }
            label
        }
    }
}

fn header_line<'a>(status: &Status, theme: &Theme) -> Line<'a> {
    let mut spans = vec![
        Span::styled(
            tracking_label(&status.branch, status.ahead, status.behind, &status.divergence),
            Style::default()
                .fg(theme.text_accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    if status.clean {
        spans.push(Span::styled("clean", Style::default().fg(theme.staged)));
    } else {
        spans.push(Span::styled(
            format!("{} staged", status.staged),
            Style::default().fg(theme.staged),
        ));
        spans.push(Span::raw(", "));
        spans.push(Span::styled(
            format!("{} unstaged", status.unstaged),
            Style::default().fg(theme.unstaged),
        ));
    }
    Line::from(spans)
}

fn render_header(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let line = match &state.status {
        Some(status) => header_line(status, theme),
        None => Line::from(Span::styled("Loading...", theme.secondary())),
    };
    let block = pane(state.repo_path.display().to_string(), false, theme);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_body(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    match state.mode {
        Mode::Workspace(view) => render_workspace(frame, state, theme, area, view),
        Mode::Commit => render_commit(frame, state, theme, area),
        Mode::Branches => render_branches(frame, state, theme, area),
        Mode::Tools(tool) => render_tools(frame, state, theme, area, tool),
    }
}

fn commit_line<'a>(commit: &Commit, theme: &Theme) -> Line<'a> {
    let mut spans = vec![
        Span::styled(commit.hash.clone(), theme.hash()),
        Span::raw(" "),
        Span::raw(commit.message.clone()),
    ];
    if !commit.author.is_empty() {
        spans.push(Span::styled(
            format!("  {}, {}", commit.author, commit.date),
            theme.secondary(),
        ));
    }
    Line::from(spans)
}

fn commit_rows<'a>(commits: &[Commit], theme: &Theme) -> Vec<Line<'a>> {
    commits.iter().map(|c| commit_line(c, theme)).collect()
}

// Workspace

fn render_workspace(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect, view: WorkspaceView) {
    match view {
        WorkspaceView::Files => render_files(frame, state, theme, area),
        WorkspaceView::Diff => {
            let (title, text) = match &state.file_diff {
                Some(diff) => (format!("Diff: {}", diff.path), diff.text.as_str()),
                None => ("Diff".to_string(), ""),
            };
            let view = DiffView::new(text, theme)
                .block(pane(title, true, theme))
                .scroll(state.text_scroll);
            frame.render_widget(view, area);
        }
        WorkspaceView::Conflicts => {
            let rows = state
                .conflicts
                .iter()
                .map(|c| {
                    let (mark, color) = if c.resolved {
                        ("✓", theme.staged)
                    } else {
                        ("✗", theme.conflicted)
                    };
                    Line::from(vec![
                        Span::styled(format!("{mark} "), Style::default().fg(color)),
                        Span::raw(c.path.clone()),
                    ])
                })
                .collect();
            let list = ScrollList::new(rows, state.cursors.conflicts, theme)
                .block(pane("Conflicts", true, theme))
                .empty("No merge conflicts");
            frame.render_widget(list, area);
        }
        WorkspaceView::Blame => {
            let rows = state
                .blame
                .iter()
                .map(|b| {
                    Line::from(vec![
                        Span::styled(format!("{} ", b.hash), theme.hash()),
                        Span::styled(format!("{:<12.12} {:<10.10} ", b.author, b.date), theme.secondary()),
                        Span::styled(format!("{:>4} ", b.line_number), theme.secondary()),
                        Span::raw(b.content.clone()),
                    ])
                })
                .collect();
            let list = ScrollList::new(rows, state.cursors.blame, theme)
                .block(pane("Blame", true, theme))
                .empty("Loading blame...");
            frame.render_widget(list, area);
        }
    }
}

fn render_files(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let rows = state
        .changes
        .iter()
        .map(|c| {
            Line::from(vec![
                Span::styled(format!("{} ", c.code), theme.change(c)),
                Span::styled(c.path.clone(), theme.change(c)),
            ])
        })
        .collect();
    let title = format!("Files ({})", state.changes.len());
    let list = ScrollList::new(rows, state.cursors.files, theme)
        .block(pane(title, true, theme))
        .empty("Working tree clean");

    if !state.show_diff_preview {
        frame.render_widget(list, area);
        return;
    }

    let list_height = visible_rows(state.viewport.1, FILE_LIST_CHROME) as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(list_height), Constraint::Min(3)])
        .split(area);
    frame.render_widget(list, chunks[0]);

    let (title, text) = match &state.file_diff {
        Some(diff) => (format!("Preview: {}", diff.path), diff.text.as_str()),
        None => ("Preview".to_string(), ""),
    };
    let preview = DiffView::new(text, theme)
        .placeholder("Select a changed file to preview its diff")
        .block(pane(title, false, theme));
    frame.render_widget(preview, chunks[1]);
}

// Commit

fn render_commit(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    if let Some(summary) = &state.commit_summary {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(area);
        let header = vec![
            Line::from(vec![
                Span::styled(summary.hash.clone(), theme.hash()),
                Span::raw(" "),
                Span::raw(summary.message.clone()),
            ]),
            Line::from(Span::styled(
                format!("{} files: {}", summary.files.len(), summary.files.join(", ")),
                theme.secondary(),
            )),
        ];
        frame.render_widget(
            Paragraph::new(header).block(pane("Committed", true, theme)),
            chunks[0],
        );
        frame.render_widget(
            DiffView::new(&summary.diff, theme)
                .block(pane("Changes", false, theme))
                .scroll(state.text_scroll),
            chunks[1],
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(5),
        ])
        .split(area);

    let cursor = if state.commit_input_focused { "_" } else { "" };
    let input = Paragraph::new(format!("{}{cursor}", state.commit_input.value()))
        .block(pane("Message", state.commit_input_focused, theme));
    frame.render_widget(input, chunks[0]);

    let rows = state
        .suggestions
        .iter()
        .map(|s| Line::from(s.message.clone()))
        .collect();
    let list = ScrollList::new(rows, state.cursors.suggestions, theme)
        .block(pane("Suggestions", !state.commit_input_focused, theme))
        .empty("No changes to describe");
    frame.render_widget(list, chunks[1]);

    let recent = Paragraph::new(commit_rows(&state.recent_commits, theme))
        .block(pane("Recent commits", false, theme));
    frame.render_widget(recent, chunks[2]);
}

// Branches

fn render_branches(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let rows = state
        .branches
        .iter()
        .map(|b| {
            let marker = if b.is_current { "* " } else { "  " };
            let style = if b.is_current {
                Style::default().fg(theme.staged).add_modifier(Modifier::BOLD)
            } else if b.is_remote {
                theme.secondary()
            } else {
                Style::default()
            };
            let mut spans = vec![Span::styled(
                format!("{marker}{}", tracking_label(&b.name, b.ahead, b.behind, &b.divergence)),
                style,
            )];
            if let Some(upstream) = &b.upstream {
                spans.push(Span::styled(format!("  -> {upstream}"), theme.secondary()));
            }
            Line::from(spans)
        })
        .collect();
    let list = ScrollList::new(rows, state.cursors.branches, theme)
        .block(pane("Branches", true, theme))
        .empty("No branches");

    let Some(comparison) = &state.comparison else {
        frame.render_widget(list, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    frame.render_widget(list, chunks[0]);

    let mut lines = vec![Line::from(Span::styled(
        format!("{} commits only on {}", comparison.ahead.len(), comparison.target),
        Style::default().fg(theme.text_accent),
    ))];
    lines.extend(commit_rows(&comparison.ahead, theme));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("{} commits only on the current branch", comparison.behind.len()),
        Style::default().fg(theme.text_accent),
    )));
    lines.extend(commit_rows(&comparison.behind, theme));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("{} files differ", comparison.files.len()),
        Style::default().fg(theme.text_accent),
    )));
    lines.extend(comparison.files.iter().map(|f| Line::from(format!("  {f}"))));
    frame.render_widget(
        Paragraph::new(lines).block(pane(format!("Compare with {}", comparison.target), false, theme)),
        chunks[1],
    );
}

// Tools

fn detail_lines<'a>(detail: &CommitDetail, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(detail.hash.clone(), theme.hash()),
            Span::raw(" "),
            Span::styled(detail.subject.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(
            format!("{} <{}>, {}", detail.author, detail.email, detail.date),
            theme.secondary(),
        )),
    ];
    lines.extend(detail.body.lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::from(vec![
        Span::raw(format!("{} files ", detail.files.len())),
        Span::styled(format!("+{}", detail.insertions), Style::default().fg(theme.diff_added)),
        Span::raw(" "),
        Span::styled(format!("-{}", detail.deletions), Style::default().fg(theme.diff_removed)),
    ]));
    lines
}

fn render_detail(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) -> bool {
    let Some((detail, diff)) = &state.commit_detail else {
        return false;
    };
    let header = detail_lines(detail, theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header.len() as u16 + 2),
            Constraint::Min(3),
        ])
        .split(area);
    frame.render_widget(
        Paragraph::new(header)
            .wrap(Wrap { trim: false })
            .block(pane("Commit", true, theme)),
        chunks[0],
    );
    frame.render_widget(
        DiffView::new(diff, theme)
            .block(pane("Diff", false, theme))
            .scroll(state.text_scroll),
        chunks[1],
    );
    true
}

fn render_tools(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect, tool: ToolMode) {
    match tool {
        ToolMode::Menu => {
            let rows = TOOL_MENU
                .iter()
                .map(|entry| {
                    Line::from(vec![
                        Span::styled(format!("[{}] ", entry.key), Style::default().fg(theme.text_accent)),
                        Span::styled(format!("{:<10}", entry.label), Style::default().add_modifier(Modifier::BOLD)),
                        Span::styled(entry.description, theme.secondary()),
                    ])
                })
                .collect();
            let list = ScrollList::new(rows, state.cursors.menu, theme).block(pane("Tools", true, theme));
            frame.render_widget(list, area);
        }
        ToolMode::Stash => {
            let rows = state
                .stashes
                .iter()
                .map(|s| {
                    Line::from(vec![
                        Span::styled(format!("{} ", s.selector()), theme.hash()),
                        Span::raw(s.message.clone()),
                        Span::styled(format!("  {}", s.date), theme.secondary()),
                    ])
                })
                .collect();
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(area);
            frame.render_widget(
                ScrollList::new(rows, state.cursors.stashes, theme)
                    .block(pane("Stashes", true, theme))
                    .empty("No stashes"),
                chunks[0],
            );
            let diff = state.stash_diff.as_ref().map_or("", |(_, d)| d.as_str());
            frame.render_widget(
                DiffView::new(diff, theme)
                    .placeholder("No stash selected")
                    .block(pane("Stash diff", false, theme)),
                chunks[1],
            );
        }
        ToolMode::Tags => {
            let rows = state
                .tags
                .iter()
                .map(|t| {
                    let mut spans = vec![
                        Span::styled(t.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                        Span::styled(format!("  {} {}", t.commit, t.date), theme.secondary()),
                    ];
                    if t.annotated {
                        spans.push(Span::styled("  annotated", Style::default().fg(theme.text_accent)));
                    }
                    if let Some(message) = &t.message {
                        spans.push(Span::raw(format!("  {message}")));
                    }
                    Line::from(spans)
                })
                .collect();
            frame.render_widget(
                ScrollList::new(rows, state.cursors.tags, theme)
                    .block(pane("Tags", true, theme))
                    .empty("No tags"),
                area,
            );
        }
        ToolMode::Hooks => {
            let rows = state
                .hooks
                .iter()
                .map(|h| {
                    let (mark, color) = if h.installed {
                        ("[x]", theme.staged)
                    } else {
                        ("[ ]", theme.text_secondary)
                    };
                    Line::from(vec![
                        Span::styled(format!("{mark} "), Style::default().fg(color)),
                        Span::styled(format!("{:<22}", h.kind.id()), Style::default().add_modifier(Modifier::BOLD)),
                        Span::styled(h.kind.description(), theme.secondary()),
                    ])
                })
                .collect();
            frame.render_widget(
                ScrollList::new(rows, state.cursors.hooks, theme).block(pane("Hooks", true, theme)),
                area,
            );
        }
        ToolMode::Log => {
            if render_detail(frame, state, theme, area) {
                return;
            }
            let title = match &state.log_search {
                Some(query) => format!("Log: \"{query}\""),
                None => "Log".to_string(),
            };
            frame.render_widget(
                ScrollList::new(commit_rows(&state.log, theme), state.cursors.log, theme)
                    .block(pane(title, true, theme))
                    .empty("No commits"),
                area,
            );
        }
        ToolMode::Rebase => {
            let rows = state
                .rebase_plan
                .commits
                .iter()
                .map(|c| {
                    let action_style = if c.action.melds() {
                        Style::default().fg(theme.unstaged)
                    } else {
                        Style::default().fg(theme.text_accent)
                    };
                    Line::from(vec![
                        Span::styled(format!("{:<7}", c.action.as_str()), action_style),
                        Span::styled(format!("{} ", c.hash), theme.hash()),
                        Span::raw(c.message.clone()),
                    ])
                })
                .collect();
            let (title, empty) = if state.rebase_in_progress {
                (
                    "Rebase plan (rebase in progress)",
                    "A rebase stopped midway: A aborts it, C continues",
                )
            } else {
                (
                    "Rebase plan (newest first)",
                    "Press Enter to choose how many commits to rebase",
                )
            };
            frame.render_widget(
                ScrollList::new(rows, state.cursors.rebase, theme)
                    .block(pane(title, true, theme))
                    .empty(empty),
                area,
            );
        }
        ToolMode::Clean => {
            let rows = state
                .clean_candidates
                .iter()
                .map(|p| Line::from(Span::styled(p.clone(), Style::default().fg(theme.untracked))))
                .collect();
            frame.render_widget(
                ScrollList::new(rows, state.cursors.clean, theme)
                    .block(pane("Untracked files to remove", true, theme))
                    .empty("Nothing to clean"),
                area,
            );
        }
        ToolMode::Clone | ToolMode::Init => {
            let text = format!(
                "New repositories are created under {}\n\nPress Enter to start, Esc to go back.",
                state.launch_dir.display()
            );
            let title = if tool == ToolMode::Clone { "Clone" } else { "Init" };
            frame.render_widget(Paragraph::new(text).block(pane(title, true, theme)), area);
        }
        ToolMode::Undo => {
            let title = match state.undo_source {
                UndoSource::History => "Undo: commits",
                UndoSource::Reflog => "Undo: reflog",
            };
            frame.render_widget(
                ScrollList::new(commit_rows(state.undo_list(), theme), state.cursors.undo, theme)
                    .block(pane(title, true, theme))
                    .empty("No history"),
                area,
            );
        }
        ToolMode::History => {
            if render_detail(frame, state, theme, area) {
                return;
            }
            frame.render_widget(
                ScrollList::new(commit_rows(&state.history, theme), state.cursors.history, theme)
                    .block(pane("History", true, theme))
                    .empty("No commits"),
                area,
            );
        }
        ToolMode::Remote => {
            let lines = match &state.status {
                Some(status) => vec![
                    header_line(status, theme),
                    Line::default(),
                    Line::from(format!("{} commits to push, {} to pull", status.ahead, status.behind)),
                ],
                None => vec![Line::from("Loading...")],
            };
            frame.render_widget(Paragraph::new(lines).block(pane("Remote", true, theme)), area);
        }
    }
}

/// One-line key reference for the current mode
pub fn hints(state: &AppState) -> &'static str {
    if state.prompt.is_some() {
        return "Enter: submit  Esc: cancel  Ctrl-u: clear";
    }
    if state.text_focused() {
        return "Enter: commit  Esc: leave message";
    }
    match state.mode {
        Mode::Workspace(WorkspaceView::Files) => {
            "space: stage/unstage  a: stage all  u: unstage all  d: discard  z: reset commit  Enter: diff  v: preview  b: blame  x: conflicts"
        }
        Mode::Workspace(WorkspaceView::Diff) => "j/k: scroll  Esc: back",
        Mode::Workspace(WorkspaceView::Conflicts) => "space: mark resolved  Enter: diff  Esc: back",
        Mode::Workspace(WorkspaceView::Blame) => "j/k: move  Esc: back",
        Mode::Commit if state.commit_summary.is_some() => "p: push  j/k: scroll  Enter: done",
        Mode::Commit => "Enter: use suggestion  i: write message",
        Mode::Branches => "Enter: checkout  n: new  d: delete  c: compare",
        Mode::Tools(tool) => match tool {
            ToolMode::Menu => "Enter or key: open  l: pull  m: remote",
            ToolMode::Stash => "s: stash  p: pop  a: apply  d: drop  Esc: back",
            ToolMode::Tags => "n: tag  a: annotated  d: delete  p: push  P: push all  Esc: back",
            ToolMode::Hooks => "Enter: install/remove  Esc: back",
            ToolMode::Log => "Enter: details  /: search  c: cherry-pick  v: revert  A: abort pick  Esc: back",
            ToolMode::Rebase => "p/r/s/f/d: action  Enter: execute  A: abort  C: continue  Esc: back",
            ToolMode::Clean => "x: remove all  Esc: back",
            ToolMode::Clone | ToolMode::Init => "Enter: start  Esc: back",
            ToolMode::Undo => "Enter: reset to commit  r: commits/reflog  Esc: back",
            ToolMode::History => "Enter: details  Esc: back",
            ToolMode::Remote => "p: push  l: pull  f: fetch  Esc: back",
        },
    }
}

fn render_hints(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    frame.render_widget(
        Paragraph::new(Span::styled(hints(state), theme.secondary())),
        area,
    );
}

fn render_status_bar(
    frame: &mut Frame,
    state: &AppState,
    theme: &Theme,
    area: Rect,
    busy: Option<&mut ThrobberState>,
) {
    let (text, style) = match &state.status_line {
        Some(line) => (line.text.clone(), theme.status(line.kind)),
        None => (
            "1-4: tabs  Ctrl-r: refresh  ?: help  q: quit".to_string(),
            theme.status_bar(),
        ),
    };

    let Some(throbber_state) = busy else {
        frame.render_widget(Paragraph::new(text).style(style), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(12), Constraint::Min(1)])
        .split(area);
    let throbber = Throbber::default()
        .label("working")
        .style(theme.status_bar())
        .throbber_set(BRAILLE_SIX)
        .use_type(WhichUse::Spin);
    frame.render_stateful_widget(throbber, chunks[0], throbber_state);
    frame.render_widget(Paragraph::new(text).style(style), chunks[1]);
}

const HELP_GLOBAL: &str = "\
Global:
  1-4, Tab        Switch tabs
  j/k, Up/Down    Move
  Ctrl-u/d        Page up/down
  Ctrl-r          Refresh
  Esc             Cancel a pending confirmation / go back
  ?               Help
  q, Ctrl-c       Quit

Actions marked (!) need a second press to confirm.
";

fn help_text(tab: Tab) -> &'static str {
    match tab {
        Tab::Workspace => "\
Workspace:
  space/s   Stage or unstage file
  a / u     Stage all / unstage all
  d (!)     Discard file changes
  z (!)     Reset last commit, keep changes
  Enter     Full diff
  v         Toggle diff preview
  b         Blame file
  x         Merge conflicts
",
        Tab::Commit => "\
Commit:
  Enter     Use suggestion as message
  i         Write message; Enter commits
  p (!)     Push after committing
",
        Tab::Branches => "\
Branches:
  Enter     Checkout (remote branches get a local copy)
  n         Create and switch
  d (!)     Delete branch
  c         Compare with current branch
",
        Tab::Tools => "\
Tools:
  o Log     s Stash   t Tags    h History
  u Undo    r Rebase  p Push    f Fetch
  g Hooks   x Clean   c Clone   i Init
  l Pull    m Remote
",
    }
}

fn render_help(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.modal_info));
    let text = format!(
        "{}\n{}\nPress any key to close this help.",
        help_text(state.mode.tab()),
        HELP_GLOBAL
    );
    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
