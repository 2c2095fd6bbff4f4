//! Application state machine
//!
//! One [`AppState`] value receives every event in order and answers with
//! the commands to run next. It never performs I/O itself:
//! - Key presses are routed through the per-mode handler table
//! - Result messages replace whole collections and re-clamp cursors
//! - Successful mutations enqueue their fixed reload set
//! - Destructive actions pass through the [`ConfirmGate`]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::debug;

use super::confirm::{ConfirmAction, ConfirmGate, Request};
use super::cursor::{ListCursor, visible_rows};
use super::event::{AppEvent, InputEvent, Key};
use super::handlers;
use super::input::{InputOutcome, TextInput};
use super::message::{Command, Message};
use crate::config::Config;
use crate::git::{
    BlameLine, Branch, BranchComparison, Change, Commit, CommitDetail, CommitSuggestion,
    CommitSummary, ConflictFile, HookStatus, RebasePlan, Stash, Status, Tag,
    parse_rebase_count, suggest_commit_messages,
};

/// Top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Workspace,
    Commit,
    Branches,
    Tools,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Workspace, Tab::Commit, Tab::Branches, Tab::Tools];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Workspace => "Workspace",
            Tab::Commit => "Commit",
            Tab::Branches => "Branches",
            Tab::Tools => "Tools",
        }
    }

    /// Mode a tab opens in
    pub fn home(&self) -> Mode {
        match self {
            Tab::Workspace => Mode::Workspace(WorkspaceView::Files),
            Tab::Commit => Mode::Commit,
            Tab::Branches => Mode::Branches,
            Tab::Tools => Mode::Tools(ToolMode::Menu),
        }
    }

    fn position(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.position() + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        Tab::ALL[(self.position() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceView {
    Files,
    Diff,
    Conflicts,
    Blame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolMode {
    Menu,
    Stash,
    Tags,
    Hooks,
    Log,
    Rebase,
    Clean,
    Clone,
    Init,
    Undo,
    History,
    Remote,
}

/// The active view; each tab carries only the sub-modes it can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Workspace(WorkspaceView),
    Commit,
    Branches,
    Tools(ToolMode),
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Workspace(WorkspaceView::Files)
    }
}

impl Mode {
    pub fn tab(&self) -> Tab {
        match self {
            Mode::Workspace(_) => Tab::Workspace,
            Mode::Commit => Tab::Commit,
            Mode::Branches => Tab::Branches,
            Mode::Tools(_) => Tab::Tools,
        }
    }
}

/// What a tools menu entry does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAction {
    Open(ToolMode),
    Push,
    Fetch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolEntry {
    pub key: char,
    pub label: &'static str,
    pub description: &'static str,
    pub action: ToolAction,
}

pub const TOOL_MENU: [ToolEntry; 12] = [
    ToolEntry { key: 'o', label: "Log", description: "Browse and search commits", action: ToolAction::Open(ToolMode::Log) },
    ToolEntry { key: 's', label: "Stash", description: "Save and restore work in progress", action: ToolAction::Open(ToolMode::Stash) },
    ToolEntry { key: 't', label: "Tags", description: "Create, delete and push tags", action: ToolAction::Open(ToolMode::Tags) },
    ToolEntry { key: 'h', label: "History", description: "Recent commits", action: ToolAction::Open(ToolMode::History) },
    ToolEntry { key: 'u', label: "Undo", description: "Soft reset to an earlier commit", action: ToolAction::Open(ToolMode::Undo) },
    ToolEntry { key: 'r', label: "Rebase", description: "Interactive rebase of recent commits", action: ToolAction::Open(ToolMode::Rebase) },
    ToolEntry { key: 'p', label: "Push", description: "Push the current branch", action: ToolAction::Push },
    ToolEntry { key: 'f', label: "Fetch", description: "Fetch from remotes", action: ToolAction::Fetch },
    ToolEntry { key: 'g', label: "Hooks", description: "Install or remove git hooks", action: ToolAction::Open(ToolMode::Hooks) },
    ToolEntry { key: 'x', label: "Clean", description: "Remove untracked files", action: ToolAction::Open(ToolMode::Clean) },
    ToolEntry { key: 'c', label: "Clone", description: "Clone a repository and switch to it", action: ToolAction::Open(ToolMode::Clone) },
    ToolEntry { key: 'i', label: "Init", description: "Create a repository and switch to it", action: ToolAction::Open(ToolMode::Init) },
];

/// Which text a prompt collects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    CreateBranch,
    TagName,
    AnnotatedTagName,
    AnnotatedTagMessage { name: String },
    StashMessage,
    RebaseCount,
    LogSearch,
    CloneUrl,
    InitPath,
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            PromptKind::CreateBranch => "New Branch",
            PromptKind::TagName => "New Tag",
            PromptKind::AnnotatedTagName => "New Annotated Tag",
            PromptKind::AnnotatedTagMessage { .. } => "Tag Message",
            PromptKind::StashMessage => "Stash",
            PromptKind::RebaseCount => "Interactive Rebase",
            PromptKind::LogSearch => "Search Log",
            PromptKind::CloneUrl => "Clone",
            PromptKind::InitPath => "Init",
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            PromptKind::CreateBranch => "Branch name:".to_string(),
            PromptKind::TagName | PromptKind::AnnotatedTagName => "Tag name:".to_string(),
            PromptKind::AnnotatedTagMessage { name } => format!("Message for {name}:"),
            PromptKind::StashMessage => "Stash message (optional):".to_string(),
            PromptKind::RebaseCount => "Number of commits to rebase:".to_string(),
            PromptKind::LogSearch => "Search commit messages (empty clears):".to_string(),
            PromptKind::CloneUrl => "Repository URL:".to_string(),
            PromptKind::InitPath => "Directory for the new repository:".to_string(),
        }
    }
}

/// A modal text prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: TextInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
    /// Shown while a confirmation is armed
    Confirm,
}

/// Transient message on the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
    pub expires_at: Instant,
}

/// Source of the undo list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndoSource {
    #[default]
    History,
    Reflog,
}

/// Timings and limits the state machine needs from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub status_ttl: Duration,
    pub confirm_ttl: Duration,
    pub max_rebase: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            status_ttl: config.status_ttl(),
            confirm_ttl: config.confirm_ttl(),
            max_rebase: config.max_rebase_count,
        }
    }
}

/// One `(cursor, offset)` pair per list view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursors {
    pub files: ListCursor,
    pub suggestions: ListCursor,
    pub branches: ListCursor,
    pub menu: ListCursor,
    pub stashes: ListCursor,
    pub tags: ListCursor,
    pub hooks: ListCursor,
    pub log: ListCursor,
    pub rebase: ListCursor,
    pub clean: ListCursor,
    pub undo: ListCursor,
    pub history: ListCursor,
    pub conflicts: ListCursor,
    pub blame: ListCursor,
}

/// Diff text loaded for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPane {
    pub path: String,
    pub text: String,
}

/// Everything the UI shows, and the rules for changing it
#[derive(Debug, Clone)]
pub struct AppState {
    pub repo_path: PathBuf,
    /// Directory gitdeck was started from; clone and init resolve against it
    pub launch_dir: PathBuf,
    pub settings: Settings,
    pub mode: Mode,

    pub status: Option<Status>,
    pub changes: Vec<Change>,
    pub suggestions: Vec<CommitSuggestion>,
    pub branches: Vec<Branch>,
    pub recent_commits: Vec<Commit>,
    pub history: Vec<Commit>,
    pub reflog: Vec<Commit>,
    pub log: Vec<Commit>,
    pub stashes: Vec<Stash>,
    pub tags: Vec<Tag>,
    pub hooks: Vec<HookStatus>,
    pub conflicts: Vec<ConflictFile>,
    pub blame: Vec<BlameLine>,
    pub clean_candidates: Vec<String>,
    pub comparison: Option<BranchComparison>,
    pub rebase_plan: RebasePlan,
    /// A stopped rebase is waiting for abort or continue
    pub rebase_in_progress: bool,
    pub commit_summary: Option<CommitSummary>,
    pub commit_detail: Option<(CommitDetail, String)>,
    pub file_diff: Option<DiffPane>,
    pub stash_diff: Option<(usize, String)>,

    pub cursors: Cursors,
    /// Scroll position of whichever long text is open (diff, detail, summary)
    pub text_scroll: usize,
    pub commit_input: TextInput,
    pub commit_input_focused: bool,
    pub prompt: Option<Prompt>,
    pub confirm: ConfirmGate,
    pub status_line: Option<StatusLine>,
    pub show_help: bool,
    pub show_diff_preview: bool,
    pub undo_source: UndoSource,
    pub log_search: Option<String>,
    /// Terminal size (columns, rows)
    pub viewport: (u16, u16),
    pub should_quit: bool,

    // Targets of in-flight loads; results for anything else are stale.
    pending_diff: Option<String>,
    pending_blame: Option<String>,
    pending_detail: Option<String>,
}

impl AppState {
    pub fn new(repo_path: impl Into<PathBuf>, launch_dir: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            repo_path: repo_path.into(),
            launch_dir: launch_dir.into(),
            settings,
            mode: Mode::default(),
            status: None,
            changes: Vec::new(),
            suggestions: Vec::new(),
            branches: Vec::new(),
            recent_commits: Vec::new(),
            history: Vec::new(),
            reflog: Vec::new(),
            log: Vec::new(),
            stashes: Vec::new(),
            tags: Vec::new(),
            hooks: Vec::new(),
            conflicts: Vec::new(),
            blame: Vec::new(),
            clean_candidates: Vec::new(),
            comparison: None,
            rebase_plan: RebasePlan::default(),
            rebase_in_progress: false,
            commit_summary: None,
            commit_detail: None,
            file_diff: None,
            stash_diff: None,
            cursors: Cursors::default(),
            text_scroll: 0,
            commit_input: TextInput::new(),
            commit_input_focused: false,
            prompt: None,
            confirm: ConfirmGate::new(settings.confirm_ttl),
            status_line: None,
            show_help: false,
            show_diff_preview: true,
            undo_source: UndoSource::default(),
            log_search: None,
            viewport: (80, 24),
            should_quit: false,
            pending_diff: None,
            pending_blame: None,
            pending_detail: None,
        }
    }

    /// Loads issued once at startup and after switching repositories
    pub fn initial_commands(&self) -> Vec<Command> {
        vec![
            Command::LoadStatus,
            Command::LoadChanges,
            Command::LoadRecentCommits,
        ]
    }

    /// Feed one event; returns the commands to run next
    pub fn update(&mut self, event: AppEvent, now: Instant) -> Vec<Command> {
        match event {
            AppEvent::Input(InputEvent::Key(key)) => self.handle_key(key, now),
            AppEvent::Input(InputEvent::Resize(width, height)) => {
                self.viewport = (width, height);
                self.clamp_cursors();
                Vec::new()
            }
            AppEvent::Message(message) => self.apply(message, now),
            AppEvent::Tick => {
                self.tick(now);
                Vec::new()
            }
            AppEvent::Quit => {
                self.should_quit = true;
                Vec::new()
            }
        }
    }

    // Key routing

    fn handle_key(&mut self, key: Key, now: Instant) -> Vec<Command> {
        if key == Key::Ctrl('c') {
            self.should_quit = true;
            return Vec::new();
        }
        if self.show_help {
            self.show_help = false;
            return Vec::new();
        }
        if self.prompt.is_some() {
            return self.handle_prompt_key(key, now);
        }
        if self.text_focused() {
            return handlers::commit_input(self, key, now);
        }
        if key == Key::Esc && self.confirm.cancel() {
            self.set_status("Cancelled", StatusKind::Info, now);
            return Vec::new();
        }

        self.confirm.begin_key();
        let commands = match self.global_key(key) {
            Some(commands) => commands,
            None => (handlers::handler_for(self.mode))(self, key, now),
        };
        if self.confirm.end_key() {
            self.clear_confirm_status();
        }
        commands
    }

    fn global_key(&mut self, key: Key) -> Option<Vec<Command>> {
        let commands = match key {
            Key::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            Key::Char('?') => {
                self.show_help = true;
                Vec::new()
            }
            Key::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.set_mode(Tab::ALL[index].home())
            }
            Key::Tab => self.set_mode(self.mode.tab().next().home()),
            Key::BackTab => self.set_mode(self.mode.tab().prev().home()),
            Key::Ctrl('r') => {
                let mut commands = reload_commands(self.mode, self);
                if !commands.contains(&Command::LoadStatus) {
                    commands.push(Command::LoadStatus);
                }
                commands
            }
            _ => return None,
        };
        Some(commands)
    }

    /// Whether keys go to the commit message field
    pub fn text_focused(&self) -> bool {
        self.mode == Mode::Commit && self.commit_input_focused
    }

    // Prompts

    pub fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt {
            kind,
            input: TextInput::new(),
        });
    }

    fn handle_prompt_key(&mut self, key: Key, now: Instant) -> Vec<Command> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Vec::new();
        };
        match prompt.input.handle_key(key) {
            InputOutcome::Submitted(value) => {
                let kind = prompt.kind.clone();
                self.prompt = None;
                self.submit_prompt(kind, value, now)
            }
            InputOutcome::Cancelled => {
                self.prompt = None;
                if self.prompt_only_mode() {
                    return self.set_mode(Mode::Tools(ToolMode::Menu));
                }
                Vec::new()
            }
            InputOutcome::Edited | InputOutcome::Ignored => Vec::new(),
        }
    }

    /// Modes with nothing to show besides their prompt
    fn prompt_only_mode(&self) -> bool {
        match self.mode {
            Mode::Tools(ToolMode::Clone | ToolMode::Init) => true,
            Mode::Tools(ToolMode::Rebase) => self.rebase_plan.is_empty(),
            _ => false,
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, value: String, now: Instant) -> Vec<Command> {
        let trimmed = value.trim().to_string();
        match kind {
            PromptKind::CreateBranch => {
                if trimmed.is_empty() {
                    self.set_status("Branch name is empty", StatusKind::Error, now);
                    return Vec::new();
                }
                vec![Command::CreateBranch { name: trimmed }]
            }
            PromptKind::TagName => {
                if trimmed.is_empty() {
                    self.set_status("Tag name is empty", StatusKind::Error, now);
                    return Vec::new();
                }
                vec![Command::CreateTag {
                    name: trimmed,
                    message: None,
                }]
            }
            PromptKind::AnnotatedTagName => {
                if trimmed.is_empty() {
                    self.set_status("Tag name is empty", StatusKind::Error, now);
                    return Vec::new();
                }
                self.open_prompt(PromptKind::AnnotatedTagMessage { name: trimmed });
                Vec::new()
            }
            PromptKind::AnnotatedTagMessage { name } => vec![Command::CreateTag {
                name,
                message: Some(trimmed),
            }],
            PromptKind::StashMessage => vec![Command::StashPush { message: trimmed }],
            PromptKind::RebaseCount => match parse_rebase_count(&trimmed, self.settings.max_rebase) {
                Ok(count) => vec![Command::LoadRebasePlan {
                    count: count.to_string(),
                }],
                Err(reason) => {
                    self.set_status(reason, StatusKind::Error, now);
                    Vec::new()
                }
            },
            PromptKind::LogSearch => {
                self.log_search = (!trimmed.is_empty()).then_some(trimmed);
                self.cursors.log.reset();
                self.commit_detail = None;
                vec![Command::LoadLog {
                    search: self.log_search.clone(),
                }]
            }
            PromptKind::CloneUrl => {
                if trimmed.is_empty() {
                    self.set_status("Repository URL is empty", StatusKind::Error, now);
                    return Vec::new();
                }
                self.set_status(format!("Cloning {trimmed}"), StatusKind::Info, now);
                vec![Command::Clone {
                    url: trimmed,
                    parent: self.launch_dir.clone(),
                }]
            }
            PromptKind::InitPath => {
                if trimmed.is_empty() {
                    self.set_status("Path is empty", StatusKind::Error, now);
                    return Vec::new();
                }
                vec![Command::Init {
                    path: self.launch_dir.join(trimmed),
                }]
            }
        }
    }

    // Modes

    /// Switch modes, dropping the transient data of the mode being left
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Command> {
        if mode == self.mode {
            return Vec::new();
        }
        debug!(from = ?self.mode, to = ?mode, "mode change");
        self.leave(self.mode, mode);
        self.mode = mode;
        self.enter(mode)
    }

    fn leave(&mut self, old: Mode, new: Mode) {
        match old {
            Mode::Workspace(WorkspaceView::Diff) => self.text_scroll = 0,
            Mode::Workspace(WorkspaceView::Conflicts) => self.cursors.conflicts.reset(),
            Mode::Workspace(WorkspaceView::Blame) => {
                self.blame.clear();
                self.cursors.blame.reset();
                self.pending_blame = None;
            }
            Mode::Commit => {
                self.commit_summary = None;
                self.commit_input_focused = false;
                self.text_scroll = 0;
            }
            Mode::Branches => self.comparison = None,
            Mode::Tools(ToolMode::Log | ToolMode::History) => {
                self.commit_detail = None;
                self.pending_detail = None;
                self.text_scroll = 0;
            }
            Mode::Tools(ToolMode::Stash) => self.stash_diff = None,
            Mode::Tools(ToolMode::Rebase) => {
                self.rebase_plan = RebasePlan::default();
                self.cursors.rebase.reset();
            }
            _ => {}
        }
        if old.tab() == Tab::Workspace && new.tab() != Tab::Workspace {
            self.file_diff = None;
            self.pending_diff = None;
        }
    }

    fn enter(&mut self, mode: Mode) -> Vec<Command> {
        match mode {
            Mode::Tools(ToolMode::Rebase) => self.open_prompt(PromptKind::RebaseCount),
            Mode::Tools(ToolMode::Clone) => self.open_prompt(PromptKind::CloneUrl),
            Mode::Tools(ToolMode::Init) => self.open_prompt(PromptKind::InitPath),
            _ => {}
        }
        reload_commands(mode, self)
    }

    // Confirmation

    /// Run `command` only on the second identical request
    pub fn guard(&mut self, action: ConfirmAction, command: Command, now: Instant) -> Vec<Command> {
        match self.confirm.request(action.clone(), now) {
            Request::Armed => {
                let ttl = self.settings.confirm_ttl;
                self.set_status_for(action.prompt(), StatusKind::Confirm, ttl, now);
                Vec::new()
            }
            Request::Confirmed => {
                self.clear_confirm_status();
                vec![command]
            }
            Request::Cleared => {
                self.set_status("Confirmation cleared", StatusKind::Warning, now);
                Vec::new()
            }
        }
    }

    fn clear_confirm_status(&mut self) {
        if self
            .status_line
            .as_ref()
            .is_some_and(|s| s.kind == StatusKind::Confirm)
        {
            self.status_line = None;
        }
    }

    // Status line

    pub fn set_status(&mut self, text: impl Into<String>, kind: StatusKind, now: Instant) {
        let ttl = self.settings.status_ttl;
        self.set_status_for(text, kind, ttl, now);
    }

    fn set_status_for(&mut self, text: impl Into<String>, kind: StatusKind, ttl: Duration, now: Instant) {
        self.status_line = Some(StatusLine {
            text: text.into(),
            kind,
            expires_at: now + ttl,
        });
    }

    fn tick(&mut self, now: Instant) {
        if self.confirm.expire(now) {
            self.clear_confirm_status();
        }
        if self.status_line.as_ref().is_some_and(|s| now >= s.expires_at) {
            self.status_line = None;
        }
    }

    // Selection helpers

    /// Rows available to a list with `chrome` extra rows around it
    pub fn list_rows(&self, chrome: u16) -> usize {
        visible_rows(self.viewport.1, chrome)
    }

    pub fn selected_change(&self) -> Option<&Change> {
        self.changes.get(self.cursors.files.selected)
    }

    pub fn selected_branch(&self) -> Option<&Branch> {
        self.branches.get(self.cursors.branches.selected)
    }

    pub fn selected_stash(&self) -> Option<&Stash> {
        self.stashes.get(self.cursors.stashes.selected)
    }

    pub fn selected_tag(&self) -> Option<&Tag> {
        self.tags.get(self.cursors.tags.selected)
    }

    pub fn selected_log_commit(&self) -> Option<&Commit> {
        self.log.get(self.cursors.log.selected)
    }

    pub fn selected_history_commit(&self) -> Option<&Commit> {
        self.history.get(self.cursors.history.selected)
    }

    pub fn undo_list(&self) -> &[Commit] {
        match self.undo_source {
            UndoSource::History => &self.history,
            UndoSource::Reflog => &self.reflog,
        }
    }

    pub fn selected_undo_commit(&self) -> Option<&Commit> {
        self.undo_list().get(self.cursors.undo.selected)
    }

    /// Ask for the diff of the selected file, or drop the shown one
    pub(crate) fn refresh_selected_diff(&mut self) -> Vec<Command> {
        if self.mode != Mode::Workspace(WorkspaceView::Files) {
            return Vec::new();
        }
        match self.selected_change().map(|c| c.target_path().to_string()) {
            Some(path) => self.request_diff(path),
            None => {
                self.file_diff = None;
                self.pending_diff = None;
                Vec::new()
            }
        }
    }

    pub(crate) fn request_diff(&mut self, path: String) -> Vec<Command> {
        self.pending_diff = Some(path.clone());
        vec![Command::LoadFileDiff { path }]
    }

    pub(crate) fn request_blame(&mut self, path: String) -> Vec<Command> {
        self.pending_blame = Some(path.clone());
        vec![Command::LoadBlame { path }]
    }

    pub(crate) fn request_detail(&mut self, hash: String) -> Vec<Command> {
        self.text_scroll = 0;
        self.pending_detail = Some(hash.clone());
        vec![Command::LoadCommitDetail { hash }]
    }

    pub(crate) fn refresh_stash_diff(&mut self) -> Vec<Command> {
        self.stash_diff = None;
        match self.selected_stash() {
            Some(stash) if self.mode == Mode::Tools(ToolMode::Stash) => {
                vec![Command::LoadStashDiff { index: stash.index }]
            }
            _ => Vec::new(),
        }
    }

    fn clamp_cursors(&mut self) {
        let files = self.list_rows(super::cursor::FILE_LIST_CHROME);
        let rows = self.list_rows(super::cursor::LIST_CHROME);
        let undo_len = self.undo_list().len();
        let c = &mut self.cursors;
        c.files.clamp(self.changes.len(), files);
        c.suggestions.clamp(self.suggestions.len(), rows);
        c.branches.clamp(self.branches.len(), rows);
        c.menu.clamp(TOOL_MENU.len(), rows);
        c.stashes.clamp(self.stashes.len(), rows);
        c.tags.clamp(self.tags.len(), rows);
        c.hooks.clamp(self.hooks.len(), rows);
        c.log.clamp(self.log.len(), rows);
        c.rebase.clamp(self.rebase_plan.len(), rows);
        c.clean.clamp(self.clean_candidates.len(), rows);
        c.undo.clamp(undo_len, rows);
        c.history.clamp(self.history.len(), rows);
        c.conflicts.clamp(self.conflicts.len(), rows);
        c.blame.clamp(self.blame.len(), rows);
    }

    // Reconciliation

    fn apply(&mut self, message: Message, now: Instant) -> Vec<Command> {
        let mut commands = Vec::new();
        match message {
            Message::Changes(changes) => {
                self.suggestions = suggest_commit_messages(&changes);
                self.changes = changes;
                self.clamp_cursors();
                commands = self.refresh_selected_diff();
            }
            Message::Status(status) => self.status = Some(status),
            Message::Branches(branches) => {
                self.branches = branches;
                self.clamp_cursors();
            }
            Message::RecentCommits(commits) => self.recent_commits = commits,
            Message::History(commits) => {
                self.history = commits;
                self.clamp_cursors();
            }
            Message::Reflog(commits) => {
                self.reflog = commits;
                self.clamp_cursors();
            }
            Message::FileDiff { path, diff } => {
                if self.pending_diff.as_deref() == Some(path.as_str()) {
                    if self.file_diff.as_ref().is_none_or(|d| d.path != path) {
                        self.text_scroll = 0;
                    }
                    self.file_diff = Some(DiffPane { path, text: diff });
                }
            }
            Message::Conflicts(conflicts) => {
                self.conflicts = conflicts;
                self.clamp_cursors();
            }
            Message::Blame { path, lines } => {
                if self.pending_blame.as_deref() == Some(path.as_str()) {
                    self.blame = lines;
                    self.clamp_cursors();
                }
            }
            Message::Comparison(comparison) => {
                if self.mode == Mode::Branches {
                    self.comparison = Some(comparison);
                }
            }
            Message::RebasePlan(plan) => {
                if self.mode == Mode::Tools(ToolMode::Rebase) {
                    self.set_status(
                        format!(
                            "{} commits loaded; p/r/s/f/d sets the action, Enter executes",
                            plan.len()
                        ),
                        StatusKind::Info,
                        now,
                    );
                    self.rebase_plan = plan;
                    self.cursors.rebase.reset();
                }
            }
            Message::RebaseInProgress(in_progress) => self.rebase_in_progress = in_progress,
            Message::Stashes(stashes) => {
                self.stashes = stashes;
                self.clamp_cursors();
                commands = self.refresh_stash_diff();
            }
            Message::StashDiff { index, diff } => {
                let selected = self.selected_stash().map(|s| s.index);
                if self.mode == Mode::Tools(ToolMode::Stash) && selected == Some(index) {
                    self.stash_diff = Some((index, diff));
                }
            }
            Message::Tags(tags) => {
                self.tags = tags;
                self.clamp_cursors();
            }
            Message::Hooks(hooks) => {
                self.hooks = hooks;
                self.clamp_cursors();
            }
            Message::Log(commits) => {
                self.log = commits;
                self.clamp_cursors();
            }
            Message::CommitDetail { detail, diff } => {
                let wanted = self
                    .pending_detail
                    .as_deref()
                    .is_some_and(|h| !h.is_empty() && detail.hash.starts_with(h));
                if wanted {
                    self.commit_detail = Some((detail, diff));
                }
            }
            Message::CleanCandidates(paths) => {
                self.clean_candidates = paths;
                self.clamp_cursors();
            }
            Message::Committed(summary) => {
                self.set_status(format!("Committed {}", summary.hash), StatusKind::Info, now);
                self.commit_input.clear();
                self.commit_input_focused = false;
                self.text_scroll = 0;
                commands = Command::Commit {
                    message: summary.message.clone(),
                }
                .follow_ups();
                self.commit_summary = Some(summary);
            }
            Message::RepoSwitched(path) => {
                let viewport = self.viewport;
                *self = AppState::new(path.clone(), self.launch_dir.clone(), self.settings);
                self.viewport = viewport;
                self.set_status(format!("Switched to {}", path.display()), StatusKind::Info, now);
                commands = self.initial_commands();
            }
            Message::Done { command, status } => {
                self.set_status(status, StatusKind::Info, now);
                commands = command.follow_ups();
                match command {
                    Command::ExecuteRebase(_) => {
                        commands.extend(self.set_mode(Mode::Tools(ToolMode::Menu)));
                    }
                    Command::Push => self.commit_summary = None,
                    _ => {}
                }
            }
            Message::Failed { command, error } => {
                debug!(?command, "operation failed");
                // A failed load must not drop an action the user has armed
                if command.is_guarded() {
                    self.confirm.cancel();
                }
                if matches!(command, Command::ExecuteRebase(_) | Command::ContinueRebase) {
                    commands.push(Command::LoadRebaseState);
                }
                let error = if error.trim().is_empty() {
                    "Command failed".to_string()
                } else {
                    error
                };
                self.set_status(error, StatusKind::Error, now);
            }
        }
        commands
    }
}

/// Loads that populate `mode`
fn reload_commands(mode: Mode, state: &AppState) -> Vec<Command> {
    match mode {
        Mode::Workspace(WorkspaceView::Files) => vec![Command::LoadChanges, Command::LoadStatus],
        Mode::Workspace(WorkspaceView::Conflicts) => vec![Command::LoadConflicts],
        Mode::Workspace(WorkspaceView::Diff | WorkspaceView::Blame) => Vec::new(),
        Mode::Commit => vec![Command::LoadChanges, Command::LoadRecentCommits],
        Mode::Branches => vec![Command::LoadBranches],
        Mode::Tools(tool) => match tool {
            ToolMode::Menu | ToolMode::Clone | ToolMode::Init => Vec::new(),
            ToolMode::Rebase => vec![Command::LoadRebaseState],
            ToolMode::Stash => vec![Command::LoadStashes],
            ToolMode::Tags => vec![Command::LoadTags],
            ToolMode::Hooks => vec![Command::LoadHooks],
            ToolMode::Log => vec![Command::LoadLog {
                search: state.log_search.clone(),
            }],
            ToolMode::Clean => vec![Command::LoadCleanCandidates],
            ToolMode::Undo => match state.undo_source {
                UndoSource::History => vec![Command::LoadHistory],
                UndoSource::Reflog => vec![Command::LoadReflog],
            },
            ToolMode::History => vec![Command::LoadHistory],
            ToolMode::Remote => vec![Command::LoadStatus],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::StatusCode;

    fn state() -> AppState {
        AppState::new("/repo", "/", Settings::default())
    }

    fn key(state: &mut AppState, key: Key, now: Instant) -> Vec<Command> {
        state.update(AppEvent::Input(InputEvent::Key(key)), now)
    }

    fn change(path: &str, code: &str) -> Change {
        Change::new(path, StatusCode::parse(code).unwrap())
    }

    #[test]
    fn test_initial_state() {
        let state = state();
        assert_eq!(state.mode, Mode::Workspace(WorkspaceView::Files));
        assert_eq!(state.cursors, Cursors::default());
        assert!(!state.confirm.is_pending());
        assert!(state.prompt.is_none());
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Workspace.next(), Tab::Commit);
        assert_eq!(Tab::Tools.next(), Tab::Workspace);
        assert_eq!(Tab::Workspace.prev(), Tab::Tools);
    }

    #[test]
    fn test_number_keys_switch_tabs() {
        let mut state = state();
        let now = Instant::now();
        let commands = key(&mut state, Key::Char('3'), now);
        assert_eq!(state.mode, Mode::Branches);
        assert_eq!(commands, vec![Command::LoadBranches]);

        key(&mut state, Key::Tab, now);
        assert_eq!(state.mode, Mode::Tools(ToolMode::Menu));
    }

    #[test]
    fn test_changes_clamp_and_load_diff() {
        let mut state = state();
        let now = Instant::now();
        state.cursors.files.selected = 4;
        let commands = state.update(
            AppEvent::Message(Message::Changes(vec![change("a.rs", " M"), change("b.rs", "??")])),
            now,
        );
        assert_eq!(state.cursors.files.selected, 1);
        assert_eq!(
            commands,
            vec![Command::LoadFileDiff {
                path: "b.rs".to_string()
            }]
        );
        assert_eq!(state.suggestions.len(), 2);
    }

    #[test]
    fn test_stale_diff_is_dropped() {
        let mut state = state();
        let now = Instant::now();
        state.update(AppEvent::Message(Message::Changes(vec![change("a.rs", " M")])), now);
        state.update(
            AppEvent::Message(Message::FileDiff {
                path: "old.rs".to_string(),
                diff: "stale".to_string(),
            }),
            now,
        );
        assert!(state.file_diff.is_none());

        state.update(
            AppEvent::Message(Message::FileDiff {
                path: "a.rs".to_string(),
                diff: "+x".to_string(),
            }),
            now,
        );
        assert_eq!(state.file_diff.as_ref().map(|d| d.text.as_str()), Some("+x"));
    }

    #[test]
    fn test_leaving_workspace_drops_diff() {
        let mut state = state();
        let now = Instant::now();
        state.file_diff = Some(DiffPane {
            path: "a".to_string(),
            text: "d".to_string(),
        });
        key(&mut state, Key::Char('2'), now);
        assert!(state.file_diff.is_none());
    }

    #[test]
    fn test_done_enqueues_follow_ups() {
        let mut state = state();
        let commands = state.update(
            AppEvent::Message(Message::Done {
                command: Command::StageAll,
                status: "Staged all changes".to_string(),
            }),
            Instant::now(),
        );
        assert_eq!(commands, vec![Command::LoadChanges, Command::LoadStatus]);
        assert_eq!(
            state.status_line.as_ref().map(|s| s.text.as_str()),
            Some("Staged all changes")
        );
    }

    #[test]
    fn test_failure_clears_confirmation() {
        let mut state = state();
        let now = Instant::now();
        state.guard(ConfirmAction::Push, Command::Push, now);
        assert!(state.confirm.is_pending());
        state.update(
            AppEvent::Message(Message::Failed {
                command: Command::Push,
                error: "fatal: no upstream".to_string(),
            }),
            now,
        );
        assert!(!state.confirm.is_pending());
        let status = state.status_line.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "fatal: no upstream");
    }

    #[test]
    fn test_failed_load_keeps_confirmation() {
        let mut state = state();
        let now = Instant::now();
        state.guard(ConfirmAction::Push, Command::Push, now);
        let commands = state.update(
            AppEvent::Message(Message::Failed {
                command: Command::LoadStatus,
                error: "Repository is locked".to_string(),
            }),
            now,
        );
        assert!(commands.is_empty());
        assert_eq!(state.confirm.pending(), Some(&ConfirmAction::Push));
        assert_eq!(
            state.guard(ConfirmAction::Push, Command::Push, now),
            vec![Command::Push]
        );
    }

    #[test]
    fn test_rebase_state_tracked() {
        let mut state = state();
        let now = Instant::now();
        let commands = state.set_mode(Mode::Tools(ToolMode::Rebase));
        assert_eq!(commands, vec![Command::LoadRebaseState]);

        let commands = state.update(
            AppEvent::Message(Message::Failed {
                command: Command::ContinueRebase,
                error: "CONFLICT (content)".to_string(),
            }),
            now,
        );
        assert_eq!(commands, vec![Command::LoadRebaseState]);
        state.update(AppEvent::Message(Message::RebaseInProgress(true)), now);
        assert!(state.rebase_in_progress);
    }

    #[test]
    fn test_status_line_expires() {
        let mut state = state();
        let now = Instant::now();
        state.set_status("hello", StatusKind::Info, now);
        state.update(AppEvent::Tick, now + Duration::from_millis(100));
        assert!(state.status_line.is_some());
        state.update(AppEvent::Tick, now + state.settings.status_ttl);
        assert!(state.status_line.is_none());
    }

    #[test]
    fn test_confirmation_expires_on_tick() {
        let mut state = state();
        let now = Instant::now();
        state.guard(ConfirmAction::Clean, Command::Clean, now);
        state.update(AppEvent::Tick, now + state.settings.confirm_ttl);
        assert!(!state.confirm.is_pending());
        assert!(state.status_line.is_none());
    }

    #[test]
    fn test_rebase_count_validated_locally() {
        let mut state = state();
        let now = Instant::now();
        state.set_mode(Mode::Tools(ToolMode::Rebase));
        assert!(matches!(
            state.prompt.as_ref().map(|p| &p.kind),
            Some(PromptKind::RebaseCount)
        ));
        for c in "99".chars() {
            key(&mut state, Key::Char(c), now);
        }
        let commands = key(&mut state, Key::Enter, now);
        assert!(commands.is_empty());
        assert_eq!(
            state.status_line.as_ref().map(|s| s.text.as_str()),
            Some("Invalid count (1-50)")
        );
    }

    #[test]
    fn test_cancelling_clone_prompt_returns_to_menu() {
        let mut state = state();
        let now = Instant::now();
        state.set_mode(Mode::Tools(ToolMode::Clone));
        key(&mut state, Key::Esc, now);
        assert!(state.prompt.is_none());
        assert_eq!(state.mode, Mode::Tools(ToolMode::Menu));
    }

    #[test]
    fn test_clone_resolves_against_launch_dir() {
        let mut state = AppState::new("/repo", "/work", Settings::default());
        let now = Instant::now();
        state.set_mode(Mode::Tools(ToolMode::Clone));
        for c in "https://x/y.git".chars() {
            key(&mut state, Key::Char(c), now);
        }
        let commands = key(&mut state, Key::Enter, now);
        assert_eq!(
            commands,
            vec![Command::Clone {
                url: "https://x/y.git".to_string(),
                parent: PathBuf::from("/work"),
            }]
        );
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut state = state();
        let now = Instant::now();
        key(&mut state, Key::Char('?'), now);
        assert!(state.show_help);
        let commands = key(&mut state, Key::Char('2'), now);
        assert!(commands.is_empty());
        assert!(!state.show_help);
        assert_eq!(state.mode, Mode::Workspace(WorkspaceView::Files));
    }
}
