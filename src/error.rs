//! Error types for gitdeck
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `Display` and `Error` impls.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for gitdeck
#[derive(Error, Debug)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),
}

/// Git invocation errors
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git is not installed or not in PATH")]
    NotInstalled,

    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// The tool exited non-zero; `output` is its raw combined text.
    #[error("{output}")]
    CommandFailed { command: String, output: String },

    #[error("git command failed after {attempts} retries: index.lock conflict")]
    LockContention { attempts: u32 },

    #[error("Failed to spawn git: {0}")]
    Spawn(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Hook error: {0}")]
    Hook(String),

    #[error("Rebase error: {0}")]
    Rebase(String),

    #[error("Semaphore acquire failed")]
    SemaphoreError,
}

impl GitError {
    /// Raw tool output for failed invocations, empty otherwise
    pub fn output(&self) -> &str {
        match self {
            GitError::CommandFailed { output, .. } => output,
            _ => "",
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to create config directory: {0}")]
    DirectoryCreationFailed(PathBuf),
}

/// TUI-related errors
#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Failed to initialize terminal: {0}")]
    InitFailed(String),

    #[error("Failed to restore terminal: {0}")]
    RestoreFailed(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Text shown to the user on the status line
    pub fn user_message(&self) -> String {
        match self {
            Error::Git(GitError::CommandFailed { output, .. }) => output.trim().to_string(),
            Error::Git(git) => git.to_string(),
            other => other.to_string(),
        }
    }

    /// Raw tool output when this is a failed git invocation
    pub fn git_output(&self) -> Option<&str> {
        match self {
            Error::Git(GitError::CommandFailed { output, .. }) => Some(output),
            _ => None,
        }
    }
}
