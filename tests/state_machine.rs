//! Drives the UI state machine through the public API with scripted events.
//! No terminal and no git process is involved.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use gitdeck::git::{Branch, Change, StatusCode};
use gitdeck::tui::{
    AppEvent, AppState, Command, ConfirmAction, InputEvent, Key, Message, Mode, Settings,
    StatusKind, Tab, ToolMode, WorkspaceView,
};

fn state() -> AppState {
    AppState::new("/work/repo", "/work", Settings::default())
}

fn press(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
    state.update(AppEvent::Input(InputEvent::Key(key)), now)
}

fn message(state: &mut AppState, message: Message, now: Instant) -> Vec<Command> {
    state.update(AppEvent::Message(message), now)
}

fn change(path: &str, code: &str) -> Change {
    Change::new(path, StatusCode::parse(code).unwrap())
}

fn with_changes(now: Instant) -> AppState {
    let mut state = state();
    message(
        &mut state,
        Message::Changes(vec![change("a.rs", " M"), change("b.rs", "M ")]),
        now,
    );
    state
}

fn status_text(state: &AppState) -> Option<&str> {
    state.status_line.as_ref().map(|s| s.text.as_str())
}

#[test]
fn test_guarded_action_needs_two_presses() {
    let now = Instant::now();
    let mut state = with_changes(now);

    assert!(press(&mut state, Key::Char('d'), now).is_empty());
    assert_eq!(
        state.confirm.pending(),
        Some(&ConfirmAction::Discard("a.rs".to_string()))
    );
    assert_eq!(
        state.status_line.as_ref().map(|s| s.kind),
        Some(StatusKind::Confirm)
    );

    let commands = press(&mut state, Key::Char('d'), now);
    assert_eq!(
        commands,
        vec![Command::Discard {
            path: "a.rs".to_string()
        }]
    );
    assert!(!state.confirm.is_pending());
    assert!(state.status_line.is_none());
}

#[test]
fn test_unrelated_key_clears_pending_confirmation() {
    let now = Instant::now();
    let mut state = with_changes(now);

    press(&mut state, Key::Char('d'), now);
    let commands = press(&mut state, Key::Down, now);
    assert!(!state.confirm.is_pending());
    assert!(state.status_line.is_none());
    assert_eq!(
        commands,
        vec![Command::LoadFileDiff {
            path: "b.rs".to_string()
        }]
    );

    // The next press arms again instead of running
    assert!(press(&mut state, Key::Char('d'), now).is_empty());
    assert!(state.confirm.is_pending());
}

#[test]
fn test_different_guarded_action_clears_both() {
    let now = Instant::now();
    let mut state = with_changes(now);

    press(&mut state, Key::Char('d'), now);
    assert!(press(&mut state, Key::Char('z'), now).is_empty());
    assert!(!state.confirm.is_pending());
    assert_eq!(status_text(&state), Some("Confirmation cleared"));

    assert!(press(&mut state, Key::Char('z'), now).is_empty());
    assert_eq!(state.confirm.pending(), Some(&ConfirmAction::ResetLastCommit));
    assert_eq!(
        press(&mut state, Key::Char('z'), now),
        vec![Command::ResetLastCommit]
    );
}

#[test]
fn test_escape_cancels_confirmation() {
    let now = Instant::now();
    let mut state = with_changes(now);

    press(&mut state, Key::Char('d'), now);
    press(&mut state, Key::Esc, now);
    assert!(!state.confirm.is_pending());
    assert_eq!(status_text(&state), Some("Cancelled"));
    assert_eq!(state.mode, Mode::Workspace(WorkspaceView::Files));
}

#[test]
fn test_confirmation_expires_on_tick() {
    let now = Instant::now();
    let mut state = with_changes(now);

    press(&mut state, Key::Char('d'), now);
    state.update(AppEvent::Tick, now + Duration::from_millis(1));
    assert!(state.confirm.is_pending());

    let later = now + state.settings.confirm_ttl;
    state.update(AppEvent::Tick, later);
    assert!(!state.confirm.is_pending());
    assert!(state.status_line.is_none());

    // Arming again after expiry does not run the action
    assert!(press(&mut state, Key::Char('d'), later).is_empty());
}

#[test]
fn test_failure_drops_pending_confirmation() {
    let now = Instant::now();
    let mut state = with_changes(now);

    press(&mut state, Key::Char('d'), now);
    message(
        &mut state,
        Message::Failed {
            command: Command::LoadStatus,
            error: "Repository is locked".to_string(),
        },
        now,
    );
    assert!(state.confirm.is_pending());

    message(
        &mut state,
        Message::Failed {
            command: Command::Push,
            error: "fatal: no upstream".to_string(),
        },
        now,
    );
    assert!(!state.confirm.is_pending());
    let status = state.status_line.as_ref().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert_eq!(status.text, "fatal: no upstream");
}

#[test]
fn test_cursor_clamps_when_list_shrinks() {
    let now = Instant::now();
    let mut state = with_changes(now);

    press(&mut state, Key::Down, now);
    assert_eq!(state.cursors.files.selected, 1);

    message(&mut state, Message::Changes(vec![change("a.rs", " M")]), now);
    assert_eq!(state.cursors.files.selected, 0);

    message(&mut state, Message::Changes(Vec::new()), now);
    assert_eq!(state.cursors.files.selected, 0);
    assert!(state.selected_change().is_none());
}

#[test]
fn test_stale_diff_is_ignored() {
    let now = Instant::now();
    let mut state = with_changes(now);
    press(&mut state, Key::Down, now);

    message(
        &mut state,
        Message::FileDiff {
            path: "a.rs".to_string(),
            diff: "+old".to_string(),
        },
        now,
    );
    assert!(state.file_diff.is_none());

    message(
        &mut state,
        Message::FileDiff {
            path: "b.rs".to_string(),
            diff: "+new".to_string(),
        },
        now,
    );
    let diff = state.file_diff.as_ref().unwrap();
    assert_eq!(diff.path, "b.rs");
    assert_eq!(diff.text, "+new");
}

#[test]
fn test_successful_mutation_requests_reloads() {
    let now = Instant::now();
    let mut state = with_changes(now);

    let commands = press(&mut state, Key::Char(' '), now);
    assert_eq!(
        commands,
        vec![Command::ToggleStage {
            path: "a.rs".to_string()
        }]
    );

    let reloads = message(
        &mut state,
        Message::Done {
            command: commands[0].clone(),
            status: "Staged a.rs".to_string(),
        },
        now,
    );
    assert_eq!(reloads, vec![Command::LoadChanges, Command::LoadStatus]);
    assert_eq!(status_text(&state), Some("Staged a.rs"));
}

#[test]
fn test_tabs_and_tool_menu() {
    let now = Instant::now();
    let mut state = state();

    assert_eq!(press(&mut state, Key::Char('3'), now), vec![Command::LoadBranches]);
    assert_eq!(state.mode.tab(), Tab::Branches);

    press(&mut state, Key::Char('4'), now);
    assert_eq!(state.mode, Mode::Tools(ToolMode::Menu));

    press(&mut state, Key::Char('s'), now);
    assert_eq!(state.mode, Mode::Tools(ToolMode::Stash));

    press(&mut state, Key::Esc, now);
    assert_eq!(state.mode, Mode::Tools(ToolMode::Menu));

    press(&mut state, Key::BackTab, now);
    assert_eq!(state.mode.tab(), Tab::Branches);
}

#[test]
fn test_create_branch_prompt() {
    let now = Instant::now();
    let mut state = state();
    press(&mut state, Key::Char('3'), now);

    press(&mut state, Key::Char('n'), now);
    assert!(state.prompt.is_some());

    // Global keys are plain text while the prompt is open
    for c in "q1-x".chars() {
        assert!(press(&mut state, Key::Char(c), now).is_empty());
    }
    assert!(!state.should_quit);
    assert_eq!(state.mode, Mode::Branches);

    let commands = press(&mut state, Key::Enter, now);
    assert_eq!(
        commands,
        vec![Command::CreateBranch {
            name: "q1-x".to_string()
        }]
    );
    assert!(state.prompt.is_none());
}

#[test]
fn test_current_branch_cannot_be_deleted() {
    let now = Instant::now();
    let mut state = state();
    press(&mut state, Key::Char('3'), now);
    message(
        &mut state,
        Message::Branches(vec![Branch {
            name: "main".to_string(),
            is_current: true,
            ..Default::default()
        }]),
        now,
    );

    assert!(press(&mut state, Key::Char('d'), now).is_empty());
    assert!(!state.confirm.is_pending());
    assert_eq!(
        state.status_line.as_ref().map(|s| s.kind),
        Some(StatusKind::Error)
    );
}

#[test]
fn test_repo_switch_resets_state() {
    let now = Instant::now();
    let mut state = with_changes(now);
    state.update(AppEvent::Input(InputEvent::Resize(120, 40)), now);
    press(&mut state, Key::Char('3'), now);

    let commands = message(
        &mut state,
        Message::RepoSwitched(PathBuf::from("/work/other")),
        now,
    );
    assert_eq!(state.repo_path, PathBuf::from("/work/other"));
    assert_eq!(state.mode, Mode::Workspace(WorkspaceView::Files));
    assert!(state.changes.is_empty());
    assert_eq!(state.viewport, (120, 40));
    assert_eq!(commands, state.initial_commands());
}

#[test]
fn test_quit_keys() {
    let now = Instant::now();
    let mut first = state();
    press(&mut first, Key::Char('q'), now);
    assert!(first.should_quit);

    let mut second = state();
    press(&mut second, Key::Ctrl('c'), now);
    assert!(second.should_quit);
}
