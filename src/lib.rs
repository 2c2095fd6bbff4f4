//! gitdeck - an interactive terminal front-end for git
//!
//! The crate is layered, leaves first:
//!
//! - [`git`] - subprocess executor with index.lock retry, output parsers,
//!   and the operations built from them
//! - [`tui`] - the interaction state machine plus its ratatui runtime
//! - [`config`] - figment-layered configuration
//! - [`error`] - error types

pub mod config;
pub mod error;
pub mod git;
pub mod tui;

pub use config::Config;
pub use error::{Error, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
