//! Main TUI application
//!
//! Event-driven runtime that coordinates:
//! - Terminal rendering with ratatui
//! - Feeding events into the [`AppState`] machine
//! - Running the commands it returns as background tasks whose results
//!   come back through the event loop

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use throbber_widgets_tui::ThrobberState;
use tracing::{debug, info, warn};

use super::event::{AppEvent, EventLoop, InputEvent};
use super::message::{Command, execute as execute_command};
use super::render::render;
use super::state::{AppState, Settings, StatusKind};
use super::theme::Theme;
use crate::config::Config;
use crate::error::{Result, TuiError};
use crate::git::GitOps;

/// Main TUI application
pub struct App {
    config: Config,
    /// Shared with running command tasks; replaced on repository switch
    ops: Arc<GitOps>,
    state: AppState,
    event_loop: EventLoop,
    theme: Theme,
    throbber: ThrobberState,
    in_flight: Arc<AtomicUsize>,
}

impl App {
    /// `launch_dir` is where clone and init place new repositories
    pub fn new(config: Config, ops: GitOps, launch_dir: PathBuf) -> Self {
        let state = AppState::new(ops.repo_path(), launch_dir, Settings::from(&config));
        Self {
            config,
            ops: Arc::new(ops),
            state,
            event_loop: EventLoop::new(),
            theme: Theme::default(),
            throbber: ThrobberState::default(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the application until the user quits
    pub async fn run(&mut self) -> Result<()> {
        self.event_loop.start(self.config.tick_rate());

        let mut terminal = setup_terminal()?;
        if let Ok(size) = terminal.size() {
            self.state.update(
                AppEvent::Input(InputEvent::Resize(size.width, size.height)),
                Instant::now(),
            );
        }
        self.dispatch(self.state.initial_commands());

        info!("Entering main loop");
        let result = self.main_loop(&mut terminal).await;
        info!("Main loop exited with result: {:?}", result.is_ok());

        restore_terminal(&mut terminal)?;
        result
    }

    async fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            let busy = self.in_flight.load(Ordering::SeqCst) > 0;
            let state = &self.state;
            let theme = &self.theme;
            let throbber = &mut self.throbber;
            terminal
                .draw(|f| render(f, state, theme, busy.then_some(throbber)))
                .map_err(|e| TuiError::RenderError(e.to_string()))?;

            let Some(event) = self.event_loop.next().await else {
                break;
            };
            if matches!(event, AppEvent::Tick) && busy {
                self.throbber.calc_next();
            }

            let commands = self.state.update(event, Instant::now());
            if self.state.repo_path.as_path() != self.ops.repo_path() {
                self.switch_repo().await;
            }
            self.dispatch(commands);

            if self.state.should_quit {
                break;
            }
        }
        Ok(())
    }

    /// Point the executor at the repository the state now shows
    async fn switch_repo(&mut self) {
        let path = self.state.repo_path.clone();
        match self.ops.for_repo(&path).await {
            Ok(ops) => {
                info!(repo = %path.display(), "switched repository");
                // git reports the resolved toplevel, which may differ in form
                self.state.repo_path = ops.repo_path().to_path_buf();
                self.ops = Arc::new(ops);
            }
            Err(e) => {
                warn!(repo = %path.display(), error = %e, "repository switch failed");
                self.state.set_status(e.user_message(), StatusKind::Error, Instant::now());
            }
        }
    }

    fn dispatch(&self, commands: Vec<Command>) {
        for command in commands {
            self.spawn(command);
        }
    }

    /// Run one command off the event loop; its message is posted back
    fn spawn(&self, command: Command) {
        debug!(?command, "dispatch");
        let ops = self.ops.clone();
        let tx = self.event_loop.sender();
        let in_flight = self.in_flight.clone();
        in_flight.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            let message = execute_command(&ops, command).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            if tx.send(AppEvent::Message(message)).await.is_err() {
                debug!("event loop closed before result was delivered");
            }
        });
    }
}

/// Setup terminal for TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().map_err(|e| TuiError::InitFailed(e.to_string()))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| TuiError::InitFailed(e.to_string()))?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).map_err(|e| TuiError::InitFailed(e.to_string()))?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().map_err(|e| TuiError::RestoreFailed(e.to_string()))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| TuiError::RestoreFailed(e.to_string()))?;
    terminal
        .show_cursor()
        .map_err(|e| TuiError::RestoreFailed(e.to_string()))?;
    info!("Terminal restore complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{GitExecutor, Limits};
    use crate::tui::message::Message;

    #[tokio::test]
    async fn test_spawned_command_posts_message() {
        let dir = tempfile::tempdir().unwrap();
        let executor = GitExecutor::new(dir.path()).with_binary("gitdeck-no-such-git");
        let ops = GitOps::new(executor, Limits::default());
        let mut app = App::new(Config::default(), ops, dir.path().to_path_buf());

        app.spawn(Command::LoadStatus);
        let event = app.event_loop.next().await.unwrap();
        assert!(matches!(
            event,
            AppEvent::Message(Message::Failed {
                command: Command::LoadStatus,
                ..
            })
        ));
        assert_eq!(app.in_flight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_state_starts_on_ops_repo() {
        let dir = tempfile::tempdir().unwrap();
        let ops = GitOps::new(GitExecutor::new(dir.path()), Limits::default());
        let app = App::new(Config::default(), ops, PathBuf::from("/"));
        assert_eq!(app.state().repo_path.as_path(), dir.path());
    }
}
