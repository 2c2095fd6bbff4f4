//! Key handlers, one per mode
//!
//! [`handler_for`] is the dispatch table: adding a mode means adding a
//! [`Mode`] variant and one arm here, and the compiler points at both.

use std::time::Instant;

use super::confirm::ConfirmAction;
use super::cursor::{FILE_LIST_CHROME, LIST_CHROME, ListCursor};
use super::event::{Key, Nav};
use super::message::Command;
use super::state::{
    AppState, Mode, PromptKind, StatusKind, TOOL_MENU, ToolAction, ToolMode, UndoSource,
    WorkspaceView,
};
use crate::git::RebaseAction;

pub type KeyHandler = fn(&mut AppState, Key, Instant) -> Vec<Command>;

pub fn handler_for(mode: Mode) -> KeyHandler {
    match mode {
        Mode::Workspace(WorkspaceView::Files) => workspace_files,
        Mode::Workspace(WorkspaceView::Diff) => workspace_diff,
        Mode::Workspace(WorkspaceView::Conflicts) => workspace_conflicts,
        Mode::Workspace(WorkspaceView::Blame) => workspace_blame,
        Mode::Commit => commit,
        Mode::Branches => branches,
        Mode::Tools(tool) => match tool {
            ToolMode::Menu => tools_menu,
            ToolMode::Stash => stash,
            ToolMode::Tags => tags,
            ToolMode::Hooks => hooks,
            ToolMode::Log => log,
            ToolMode::Rebase => rebase,
            ToolMode::Clean => clean,
            ToolMode::Clone => reopen_prompt,
            ToolMode::Init => reopen_prompt,
            ToolMode::Undo => undo,
            ToolMode::History => history,
            ToolMode::Remote => remote,
        },
    }
}

fn none() -> Vec<Command> {
    Vec::new()
}

fn back_to_menu(state: &mut AppState) -> Vec<Command> {
    state.set_mode(Mode::Tools(ToolMode::Menu))
}

/// Move a list cursor; returns whether the selection changed
fn move_in(cursor: &mut ListCursor, nav: Nav, len: usize, visible: usize) -> bool {
    cursor.navigate(nav, len, visible)
}

/// Scroll long text such as a diff or commit detail
fn scroll_text(state: &mut AppState, nav: Nav, total_lines: usize) {
    let page = state.list_rows(LIST_CHROME);
    let max = total_lines.saturating_sub(1);
    state.text_scroll = match nav {
        Nav::Up => state.text_scroll.saturating_sub(1),
        Nav::Down => (state.text_scroll + 1).min(max),
        Nav::PageUp => state.text_scroll.saturating_sub(page),
        Nav::PageDown => (state.text_scroll + page).min(max),
    };
}

// Workspace

fn workspace_files(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let visible = state.list_rows(FILE_LIST_CHROME);
        let len = state.changes.len();
        if move_in(&mut state.cursors.files, nav, len, visible) {
            return state.refresh_selected_diff();
        }
        return none();
    }

    let selected = state.selected_change().map(|c| c.target_path().to_string());
    match key {
        Key::Char(' ' | 's') => match selected {
            Some(path) => vec![Command::ToggleStage { path }],
            None => none(),
        },
        Key::Char('a') => vec![Command::StageAll],
        Key::Char('u') => {
            let staged = state.changes.iter().any(|c| c.is_staged());
            if !staged {
                state.set_status("No staged files to unstage", StatusKind::Warning, now);
                return none();
            }
            vec![Command::UnstageAll]
        }
        Key::Char('d') => match selected {
            Some(path) => state.guard(
                ConfirmAction::Discard(path.clone()),
                Command::Discard { path },
                now,
            ),
            None => none(),
        },
        Key::Char('z') => state.guard(ConfirmAction::ResetLastCommit, Command::ResetLastCommit, now),
        Key::Enter => {
            if state.file_diff.is_some() {
                state.set_mode(Mode::Workspace(WorkspaceView::Diff))
            } else {
                none()
            }
        }
        Key::Char('v') => {
            state.show_diff_preview = !state.show_diff_preview;
            none()
        }
        Key::Char('b') => match selected {
            Some(path) => {
                let mut commands = state.set_mode(Mode::Workspace(WorkspaceView::Blame));
                commands.extend(state.request_blame(path));
                commands
            }
            None => none(),
        },
        Key::Char('x') => state.set_mode(Mode::Workspace(WorkspaceView::Conflicts)),
        _ => none(),
    }
}

fn workspace_diff(state: &mut AppState, key: Key, _now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let total = state.file_diff.as_ref().map_or(0, |d| d.text.lines().count());
        scroll_text(state, nav, total);
        return none();
    }
    match key {
        Key::Esc | Key::Enter => state.set_mode(Mode::Workspace(WorkspaceView::Files)),
        _ => none(),
    }
}

fn workspace_conflicts(state: &mut AppState, key: Key, _now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        let len = state.conflicts.len();
        move_in(&mut state.cursors.conflicts, nav, len, visible);
        return none();
    }
    let selected = state.cursors.conflicts.selected;
    match key {
        Key::Char(' ') => {
            if let Some(conflict) = state.conflicts.get_mut(selected) {
                conflict.resolved = !conflict.resolved;
            }
            none()
        }
        Key::Enter => match state.conflicts.get(selected).map(|c| c.path.clone()) {
            Some(path) => {
                state.file_diff = None;
                let mut commands = state.set_mode(Mode::Workspace(WorkspaceView::Diff));
                commands.extend(state.request_diff(path));
                commands
            }
            None => none(),
        },
        Key::Esc => state.set_mode(Mode::Workspace(WorkspaceView::Files)),
        _ => none(),
    }
}

fn workspace_blame(state: &mut AppState, key: Key, _now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        let len = state.blame.len();
        move_in(&mut state.cursors.blame, nav, len, visible);
        return none();
    }
    match key {
        Key::Esc => state.set_mode(Mode::Workspace(WorkspaceView::Files)),
        _ => none(),
    }
}

// Commit

/// Keys while the commit message field has focus
pub fn commit_input(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    match key {
        Key::Enter => {
            let message = state.commit_input.value().trim().to_string();
            if message.is_empty() {
                state.set_status("Commit message is empty", StatusKind::Error, now);
                return none();
            }
            state.commit_input_focused = false;
            vec![Command::Commit { message }]
        }
        Key::Esc => {
            state.commit_input_focused = false;
            none()
        }
        _ => {
            let _ = state.commit_input.handle_key(key);
            none()
        }
    }
}

fn commit(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    if let Some(summary) = &state.commit_summary {
        if let Some(nav) = key.nav() {
            let total = summary.diff.lines().count();
            scroll_text(state, nav, total);
            return none();
        }
        return match key {
            Key::Char('p') => state.guard(ConfirmAction::Push, Command::Push, now),
            Key::Enter | Key::Esc => {
                state.commit_summary = None;
                state.text_scroll = 0;
                none()
            }
            _ => none(),
        };
    }

    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        let len = state.suggestions.len();
        move_in(&mut state.cursors.suggestions, nav, len, visible);
        return none();
    }
    match key {
        Key::Enter => {
            if let Some(suggestion) = state.suggestions.get(state.cursors.suggestions.selected) {
                state.commit_input = super::input::TextInput::with_value(suggestion.message.clone());
            }
            state.commit_input_focused = true;
            none()
        }
        Key::Char('i' | 'c') => {
            state.commit_input_focused = true;
            none()
        }
        _ => none(),
    }
}

// Branches

fn branches(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        let len = state.branches.len();
        if move_in(&mut state.cursors.branches, nav, len, visible) {
            state.comparison = None;
        }
        return none();
    }

    let selected = state.selected_branch().cloned();
    match key {
        Key::Enter => match selected {
            Some(branch) if branch.is_current => {
                state.set_status(format!("Already on {}", branch.name), StatusKind::Info, now);
                none()
            }
            Some(branch) => vec![Command::SwitchBranch(branch)],
            None => none(),
        },
        Key::Char('n') => {
            state.open_prompt(PromptKind::CreateBranch);
            none()
        }
        Key::Char('d') => match selected {
            Some(branch) if branch.is_current => {
                state.set_status("Cannot delete the current branch", StatusKind::Error, now);
                none()
            }
            Some(branch) if branch.is_remote => {
                state.set_status("Remote branches cannot be deleted here", StatusKind::Error, now);
                none()
            }
            Some(branch) => state.guard(
                ConfirmAction::DeleteBranch(branch.name.clone()),
                Command::DeleteBranch(branch),
                now,
            ),
            None => none(),
        },
        Key::Char('c') => match selected {
            Some(branch) if branch.is_current => {
                state.set_status("Select another branch to compare", StatusKind::Warning, now);
                none()
            }
            Some(branch) => vec![Command::LoadComparison {
                target: branch.name,
            }],
            None => none(),
        },
        Key::Esc => {
            state.comparison = None;
            none()
        }
        _ => none(),
    }
}

// Tools

fn activate(state: &mut AppState, action: ToolAction, now: Instant) -> Vec<Command> {
    match action {
        ToolAction::Open(mode) => state.set_mode(Mode::Tools(mode)),
        ToolAction::Push => state.guard(ConfirmAction::Push, Command::Push, now),
        ToolAction::Fetch => vec![Command::Fetch],
    }
}

fn tools_menu(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        move_in(&mut state.cursors.menu, nav, TOOL_MENU.len(), visible);
        return none();
    }
    match key {
        Key::Enter => match TOOL_MENU.get(state.cursors.menu.selected) {
            Some(entry) => activate(state, entry.action, now),
            None => none(),
        },
        Key::Char('l') => state.guard(ConfirmAction::Pull, Command::Pull, now),
        Key::Char('m') => state.set_mode(Mode::Tools(ToolMode::Remote)),
        Key::Char(c) => match TOOL_MENU.iter().find(|entry| entry.key == c) {
            Some(entry) => activate(state, entry.action, now),
            None => none(),
        },
        _ => none(),
    }
}

fn stash(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        let len = state.stashes.len();
        if move_in(&mut state.cursors.stashes, nav, len, visible) {
            return state.refresh_stash_diff();
        }
        return none();
    }

    let index = state.selected_stash().map(|s| s.index);
    match (key, index) {
        (Key::Char('n' | 's'), _) => {
            state.open_prompt(PromptKind::StashMessage);
            none()
        }
        (Key::Char('p'), Some(index)) => {
            state.guard(ConfirmAction::PopStash(index), Command::StashPop { index }, now)
        }
        (Key::Char('a'), Some(index)) => vec![Command::StashApply { index }],
        (Key::Char('d'), Some(index)) => {
            state.guard(ConfirmAction::DropStash(index), Command::StashDrop { index }, now)
        }
        (Key::Esc, _) => back_to_menu(state),
        _ => none(),
    }
}

fn tags(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        let len = state.tags.len();
        move_in(&mut state.cursors.tags, nav, len, visible);
        return none();
    }

    let name = state.selected_tag().map(|t| t.name.clone());
    match (key, name) {
        (Key::Char('n'), _) => {
            state.open_prompt(PromptKind::TagName);
            none()
        }
        (Key::Char('a'), _) => {
            state.open_prompt(PromptKind::AnnotatedTagName);
            none()
        }
        (Key::Char('d'), Some(name)) => state.guard(
            ConfirmAction::DeleteTag(name.clone()),
            Command::DeleteTag { name },
            now,
        ),
        (Key::Char('p'), Some(name)) => vec![Command::PushTag { name }],
        (Key::Char('P'), _) => vec![Command::PushAllTags],
        (Key::Esc, _) => back_to_menu(state),
        _ => none(),
    }
}

fn hooks(state: &mut AppState, key: Key, _now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        let len = state.hooks.len();
        move_in(&mut state.cursors.hooks, nav, len, visible);
        return none();
    }
    match key {
        Key::Enter | Key::Char(' ') => match state.hooks.get(state.cursors.hooks.selected) {
            Some(hook) => vec![Command::ToggleHook(hook.kind)],
            None => none(),
        },
        Key::Esc => back_to_menu(state),
        _ => none(),
    }
}

fn log(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        if let Some((_, diff)) = &state.commit_detail {
            let total = diff.lines().count();
            scroll_text(state, nav, total);
        } else {
            let visible = state.list_rows(LIST_CHROME);
            let len = state.log.len();
            move_in(&mut state.cursors.log, nav, len, visible);
        }
        return none();
    }

    let hash = state.selected_log_commit().map(|c| c.hash.clone());
    match (key, hash) {
        (Key::Esc, _) if state.commit_detail.is_some() => {
            state.commit_detail = None;
            state.text_scroll = 0;
            none()
        }
        (Key::Esc, _) => back_to_menu(state),
        (Key::Enter, Some(hash)) => state.request_detail(hash),
        (Key::Char('/'), _) => {
            state.open_prompt(PromptKind::LogSearch);
            none()
        }
        (Key::Char('c'), Some(hash)) => vec![Command::CherryPick { hash }],
        (Key::Char('v'), Some(hash)) => state.guard(
            ConfirmAction::Revert(hash.clone()),
            Command::Revert { hash },
            now,
        ),
        (Key::Char('A'), _) => vec![Command::AbortCherryPick],
        _ => none(),
    }
}

fn rebase(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    if state.rebase_plan.is_empty() {
        return match key {
            Key::Enter => {
                state.open_prompt(PromptKind::RebaseCount);
                none()
            }
            Key::Char('A') => vec![Command::AbortRebase],
            Key::Char('C') => vec![Command::ContinueRebase],
            Key::Esc => back_to_menu(state),
            _ => none(),
        };
    }

    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        let len = state.rebase_plan.len();
        move_in(&mut state.cursors.rebase, nav, len, visible);
        return none();
    }
    match key {
        Key::Char(c) if RebaseAction::from_key(c).is_some() => {
            if let Some(action) = RebaseAction::from_key(c) {
                let index = state.cursors.rebase.selected;
                state.rebase_plan.set_action(index, action);
            }
            none()
        }
        Key::Enter => match state.rebase_plan.validate() {
            Ok(()) => {
                let plan = state.rebase_plan.clone();
                state.guard(ConfirmAction::ExecuteRebase, Command::ExecuteRebase(plan), now)
            }
            Err(e) => {
                state.set_status(e.user_message(), StatusKind::Error, now);
                none()
            }
        },
        Key::Char('A') => vec![Command::AbortRebase],
        Key::Char('C') => vec![Command::ContinueRebase],
        Key::Esc => back_to_menu(state),
        _ => none(),
    }
}

fn clean(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        let len = state.clean_candidates.len();
        move_in(&mut state.cursors.clean, nav, len, visible);
        return none();
    }
    match key {
        Key::Enter | Key::Char('x') => {
            if state.clean_candidates.is_empty() {
                state.set_status("Nothing to clean", StatusKind::Info, now);
                return none();
            }
            state.guard(ConfirmAction::Clean, Command::Clean, now)
        }
        Key::Esc => back_to_menu(state),
        _ => none(),
    }
}

/// Clone and init only show a prompt; Enter brings it back
fn reopen_prompt(state: &mut AppState, key: Key, _now: Instant) -> Vec<Command> {
    match (key, state.mode) {
        (Key::Enter, Mode::Tools(ToolMode::Clone)) => {
            state.open_prompt(PromptKind::CloneUrl);
            none()
        }
        (Key::Enter, Mode::Tools(ToolMode::Init)) => {
            state.open_prompt(PromptKind::InitPath);
            none()
        }
        (Key::Esc, _) => back_to_menu(state),
        _ => none(),
    }
}

fn undo(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        let visible = state.list_rows(LIST_CHROME);
        let len = state.undo_list().len();
        move_in(&mut state.cursors.undo, nav, len, visible);
        return none();
    }

    let hash = state.selected_undo_commit().map(|c| c.hash.clone());
    match (key, hash) {
        (Key::Char('r'), _) => {
            state.cursors.undo.reset();
            match state.undo_source {
                UndoSource::History => {
                    state.undo_source = UndoSource::Reflog;
                    vec![Command::LoadReflog]
                }
                UndoSource::Reflog => {
                    state.undo_source = UndoSource::History;
                    vec![Command::LoadHistory]
                }
            }
        }
        (Key::Enter, Some(hash)) => state.guard(
            ConfirmAction::UndoTo(hash.clone()),
            Command::UndoTo { hash },
            now,
        ),
        (Key::Esc, _) => back_to_menu(state),
        _ => none(),
    }
}

fn history(state: &mut AppState, key: Key, _now: Instant) -> Vec<Command> {
    if let Some(nav) = key.nav() {
        if let Some((_, diff)) = &state.commit_detail {
            let total = diff.lines().count();
            scroll_text(state, nav, total);
        } else {
            let visible = state.list_rows(LIST_CHROME);
            let len = state.history.len();
            move_in(&mut state.cursors.history, nav, len, visible);
        }
        return none();
    }

    let hash = state.selected_history_commit().map(|c| c.hash.clone());
    match (key, hash) {
        (Key::Esc, _) if state.commit_detail.is_some() => {
            state.commit_detail = None;
            state.text_scroll = 0;
            none()
        }
        (Key::Esc, _) => back_to_menu(state),
        (Key::Enter, Some(hash)) => state.request_detail(hash),
        _ => none(),
    }
}

fn remote(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    match key {
        Key::Char('p') => state.guard(ConfirmAction::Push, Command::Push, now),
        Key::Char('l') => state.guard(ConfirmAction::Pull, Command::Pull, now),
        Key::Char('f') => vec![Command::Fetch],
        Key::Esc => back_to_menu(state),
        _ => none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{Branch, Change, Commit, Divergence, StatusCode};
    use crate::tui::event::{AppEvent, InputEvent};
    use crate::tui::message::Message;
    use crate::tui::state::Settings;

    fn press(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
        state.update(AppEvent::Input(InputEvent::Key(key)), now)
    }

    fn with_changes(paths: &[(&str, &str)]) -> AppState {
        let mut state = AppState::new("/repo", "/", Settings::default());
        let changes = paths
            .iter()
            .map(|(p, c)| Change::new(*p, StatusCode::parse(c).unwrap()))
            .collect();
        state.update(AppEvent::Message(Message::Changes(changes)), Instant::now());
        state
    }

    fn branch(name: &str, current: bool) -> Branch {
        Branch {
            name: name.to_string(),
            is_current: current,
            is_remote: false,
            upstream: None,
            ahead: 0,
            behind: 0,
            divergence: Divergence::None,
        }
    }

    fn commit(hash: &str) -> Commit {
        Commit {
            hash: hash.to_string(),
            message: "msg".to_string(),
            author: "a".to_string(),
            date: "now".to_string(),
        }
    }

    #[test]
    fn test_table_covers_every_mode() {
        let mut state = AppState::new("/repo", "/", Settings::default());
        for mode in [
            Mode::Workspace(WorkspaceView::Files),
            Mode::Workspace(WorkspaceView::Diff),
            Mode::Workspace(WorkspaceView::Conflicts),
            Mode::Workspace(WorkspaceView::Blame),
            Mode::Commit,
            Mode::Branches,
            Mode::Tools(ToolMode::Menu),
            Mode::Tools(ToolMode::Hooks),
            Mode::Tools(ToolMode::Remote),
        ] {
            state.mode = mode;
            assert!(handler_for(mode)(&mut state, Key::Char('Z'), Instant::now()).is_empty());
        }
    }

    #[test]
    fn test_toggle_stage_selected() {
        let mut state = with_changes(&[("a.rs", " M"), ("b.rs", "??")]);
        let now = Instant::now();
        let commands = press(&mut state, Key::Down, now);
        assert_eq!(
            commands,
            vec![Command::LoadFileDiff {
                path: "b.rs".to_string()
            }]
        );
        assert_eq!(
            press(&mut state, Key::Char(' '), now),
            vec![Command::ToggleStage {
                path: "b.rs".to_string()
            }]
        );
    }

    #[test]
    fn test_rename_uses_destination() {
        let mut state = with_changes(&[("old.rs -> new.rs", "R ")]);
        assert_eq!(
            press(&mut state, Key::Char('s'), Instant::now()),
            vec![Command::ToggleStage {
                path: "new.rs".to_string()
            }]
        );
    }

    #[test]
    fn test_discard_needs_two_presses() {
        let mut state = with_changes(&[("a.rs", " M")]);
        let now = Instant::now();
        assert!(press(&mut state, Key::Char('d'), now).is_empty());
        assert!(state.confirm.is_pending());
        assert_eq!(
            press(&mut state, Key::Char('d'), now),
            vec![Command::Discard {
                path: "a.rs".to_string()
            }]
        );
        assert!(!state.confirm.is_pending());
    }

    #[test]
    fn test_unstage_all_warns_without_staged() {
        let mut state = with_changes(&[("a.rs", " M")]);
        assert!(press(&mut state, Key::Char('u'), Instant::now()).is_empty());
        assert_eq!(
            state.status_line.as_ref().map(|s| s.kind),
            Some(StatusKind::Warning)
        );
    }

    #[test]
    fn test_blame_opens_view_and_loads() {
        let mut state = with_changes(&[("a.rs", " M")]);
        let commands = press(&mut state, Key::Char('b'), Instant::now());
        assert_eq!(state.mode, Mode::Workspace(WorkspaceView::Blame));
        assert_eq!(
            commands,
            vec![Command::LoadBlame {
                path: "a.rs".to_string()
            }]
        );
    }

    #[test]
    fn test_commit_from_suggestion() {
        let mut state = with_changes(&[("src/new.rs", "A ")]);
        let now = Instant::now();
        press(&mut state, Key::Char('2'), now);
        press(&mut state, Key::Enter, now);
        assert!(state.text_focused());
        assert_eq!(state.commit_input.value(), "feat: add new feature (1 file)");

        // 'q' is text while typing
        press(&mut state, Key::Char('q'), now);
        assert!(!state.should_quit);

        let commands = press(&mut state, Key::Enter, now);
        assert_eq!(
            commands,
            vec![Command::Commit {
                message: "feat: add new feature (1 file)q".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_commit_message_rejected() {
        let mut state = with_changes(&[]);
        let now = Instant::now();
        press(&mut state, Key::Char('2'), now);
        press(&mut state, Key::Char('i'), now);
        assert!(press(&mut state, Key::Enter, now).is_empty());
        assert_eq!(
            state.status_line.as_ref().map(|s| s.text.as_str()),
            Some("Commit message is empty")
        );
    }

    #[test]
    fn test_cannot_delete_current_branch() {
        let mut state = AppState::new("/repo", "/", Settings::default());
        let now = Instant::now();
        press(&mut state, Key::Char('3'), now);
        state.update(
            AppEvent::Message(Message::Branches(vec![branch("main", true), branch("dev", false)])),
            now,
        );
        assert!(press(&mut state, Key::Char('d'), now).is_empty());
        assert!(!state.confirm.is_pending());

        press(&mut state, Key::Down, now);
        press(&mut state, Key::Char('d'), now);
        let commands = press(&mut state, Key::Char('d'), now);
        assert_eq!(commands, vec![Command::DeleteBranch(branch("dev", false))]);
    }

    #[test]
    fn test_menu_quick_keys() {
        let mut state = AppState::new("/repo", "/", Settings::default());
        let now = Instant::now();
        press(&mut state, Key::Char('4'), now);
        assert_eq!(press(&mut state, Key::Char('s'), now), vec![Command::LoadStashes]);
        assert_eq!(state.mode, Mode::Tools(ToolMode::Stash));

        press(&mut state, Key::Esc, now);
        assert_eq!(state.mode, Mode::Tools(ToolMode::Menu));
        assert_eq!(press(&mut state, Key::Char('f'), now), vec![Command::Fetch]);
    }

    #[test]
    fn test_rebase_plan_actions_and_execute() {
        let mut state = AppState::new("/repo", "/", Settings::default());
        let now = Instant::now();
        state.set_mode(Mode::Tools(ToolMode::Rebase));
        state.prompt = None;
        let plan = crate::git::RebasePlan::from_log(vec![commit("c3"), commit("c2"), commit("c1")]);
        state.update(AppEvent::Message(Message::RebasePlan(plan)), now);

        press(&mut state, Key::Char('s'), now);
        assert_eq!(state.rebase_plan.commits[0].action, RebaseAction::Squash);

        assert!(press(&mut state, Key::Enter, now).is_empty());
        let commands = press(&mut state, Key::Enter, now);
        assert!(matches!(commands.as_slice(), [Command::ExecuteRebase(_)]));
    }

    #[test]
    fn test_undo_source_toggle() {
        let mut state = AppState::new("/repo", "/", Settings::default());
        let now = Instant::now();
        state.set_mode(Mode::Tools(ToolMode::Undo));
        assert_eq!(press(&mut state, Key::Char('r'), now), vec![Command::LoadReflog]);
        assert_eq!(state.undo_source, UndoSource::Reflog);
        assert_eq!(press(&mut state, Key::Char('r'), now), vec![Command::LoadHistory]);
    }

    #[test]
    fn test_log_detail_then_escape() {
        let mut state = AppState::new("/repo", "/", Settings::default());
        let now = Instant::now();
        state.set_mode(Mode::Tools(ToolMode::Log));
        state.update(AppEvent::Message(Message::Log(vec![commit("abc1234")])), now);
        assert_eq!(
            press(&mut state, Key::Enter, now),
            vec![Command::LoadCommitDetail {
                hash: "abc1234".to_string()
            }]
        );
        let detail = crate::git::CommitDetail {
            hash: "abc1234ffff".to_string(),
            ..Default::default()
        };
        state.update(
            AppEvent::Message(Message::CommitDetail {
                detail,
                diff: String::new(),
            }),
            now,
        );
        assert!(state.commit_detail.is_some());
        press(&mut state, Key::Esc, now);
        assert!(state.commit_detail.is_none());
        assert_eq!(state.mode, Mode::Tools(ToolMode::Log));
    }
}
