//! Event handling for the TUI
//!
//! Provides an async event stream that combines:
//! - Terminal input events (keys, resizes)
//! - Results of operations running in background tasks
//! - Ticks that expire status messages and pending confirmations

use std::time::Duration;

use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use super::message::Message;

/// Application events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Terminal input event
    Input(InputEvent),
    /// Result of a background operation
    Message(Message),
    /// Periodic tick
    Tick,
    /// Request to quit the application
    Quit,
}

/// Input events from the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    /// Terminal resize (columns, rows)
    Resize(u16, u16),
}

/// A key press, reduced to what the state machine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Up,
    Down,
    PageUp,
    PageDown,
}

impl Key {
    /// Convert a crossterm key press; releases and unknown keys yield `None`
    pub fn from_event(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let key = match key.code {
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => Key::Ctrl(c),
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Esc,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            _ => return None,
        };
        Some(key)
    }

    /// Vertical movement this key requests in a list, if any
    pub fn nav(self) -> Option<Nav> {
        match self {
            Key::Up | Key::Char('k') => Some(Nav::Up),
            Key::Down | Key::Char('j') => Some(Nav::Down),
            Key::PageUp | Key::Ctrl('u') => Some(Nav::PageUp),
            Key::PageDown | Key::Ctrl('d') => Some(Nav::PageDown),
            _ => None,
        }
    }
}

/// List navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Up,
    Down,
    PageUp,
    PageDown,
}

/// Event loop handle
pub struct EventLoop {
    /// Sender for events
    tx: mpsc::Sender<AppEvent>,
    /// Receiver for events
    rx: mpsc::Receiver<AppEvent>,
}

impl EventLoop {
    /// Create a new event loop
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(256);
        Self { tx, rx }
    }

    /// Get a sender for posting events
    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }

    /// Start the event loop
    ///
    /// This spawns background tasks for:
    /// - Terminal input
    /// - Ticks
    pub fn start(&mut self, tick_rate: Duration) {
        let tx = self.tx.clone();

        // Terminal input task - single long-running reader
        tokio::spawn(async move {
            let mut reader = EventStream::new();

            loop {
                match reader.next().fuse().await {
                    Some(Ok(event)) => {
                        let input = match event {
                            CrosstermEvent::Key(key) => match Key::from_event(key) {
                                Some(key) => InputEvent::Key(key),
                                None => continue,
                            },
                            CrosstermEvent::Resize(w, h) => InputEvent::Resize(w, h),
                            _ => continue,
                        };

                        if tx.send(AppEvent::Input(input)).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("Error reading terminal event: {}", e);
                        continue;
                    }
                    None => break,
                }
            }
        });

        // Tick task
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);

            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).await.is_err() {
                    break;
                }
            }
        });
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_conversion() {
        let key = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(Key::from_event(key), Some(Key::Char('j')));

        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Key::from_event(key), Some(Key::Ctrl('c')));

        let key = KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT);
        assert_eq!(Key::from_event(key), Some(Key::Char('S')));

        let key = KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE);
        assert_eq!(Key::from_event(key), None);
    }

    #[test]
    fn test_release_events_ignored() {
        let mut key = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(Key::from_event(key), None);
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(Key::Char('j').nav(), Some(Nav::Down));
        assert_eq!(Key::Up.nav(), Some(Nav::Up));
        assert_eq!(Key::PageDown.nav(), Some(Nav::PageDown));
        assert_eq!(Key::Char('x').nav(), None);
    }

    #[tokio::test]
    async fn test_ticks_are_delivered() {
        let mut events = EventLoop::new();
        let tx = events.sender();
        tx.send(AppEvent::Tick).await.unwrap();
        assert_eq!(events.next().await, Some(AppEvent::Tick));
    }
}
