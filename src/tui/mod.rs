//! Terminal UI module using ratatui
//!
//! Event-driven TUI with:
//! - A single [`AppState`] value updated by `(state, event) -> commands`
//! - Commands run in background tasks, results posted back as messages
//! - Two-step confirmation for destructive actions
//! - Modal prompts and a help overlay

mod app;
mod confirm;
mod cursor;
mod event;
mod handlers;
mod input;
mod message;
mod render;
mod state;
mod theme;
mod widgets;

pub use app::*;
pub use confirm::*;
pub use cursor::*;
pub use event::*;
pub use handlers::{KeyHandler, handler_for};
pub use input::*;
pub use message::*;
pub use render::{centered_rect, hints, render};
pub use state::*;
pub use theme::*;
