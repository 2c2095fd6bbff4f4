//! Two-step confirmation for destructive and remote-affecting actions
//!
//! The first request arms a token, a second identical request while the
//! token is still armed confirms it. Anything else clears it.

use std::time::{Duration, Instant};

/// Actions that need a second keypress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Discard(String),
    ResetLastCommit,
    DeleteBranch(String),
    Push,
    Pull,
    UndoTo(String),
    ExecuteRebase,
    PopStash(usize),
    DropStash(usize),
    DeleteTag(String),
    Revert(String),
    Clean,
}

impl ConfirmAction {
    /// Status-line question shown while armed
    pub fn prompt(&self) -> String {
        let what = match self {
            ConfirmAction::Discard(path) => format!("Discard changes to {path}?"),
            ConfirmAction::ResetLastCommit => "Reset the last commit?".to_string(),
            ConfirmAction::DeleteBranch(name) => format!("Delete branch {name}?"),
            ConfirmAction::Push => "Push to remote?".to_string(),
            ConfirmAction::Pull => "Pull from remote?".to_string(),
            ConfirmAction::UndoTo(hash) => format!("Reset to {hash}?"),
            ConfirmAction::ExecuteRebase => "Execute the rebase plan?".to_string(),
            ConfirmAction::PopStash(i) => format!("Pop stash@{{{i}}}?"),
            ConfirmAction::DropStash(i) => format!("Drop stash@{{{i}}}?"),
            ConfirmAction::DeleteTag(name) => format!("Delete tag {name}?"),
            ConfirmAction::Revert(hash) => format!("Revert {hash}?"),
            ConfirmAction::Clean => "Remove all untracked files?".to_string(),
        };
        format!("{what} Press again to confirm, Esc to cancel")
    }
}

/// What a request did to the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Token set; nothing runs yet
    Armed,
    /// Second identical request; run the action
    Confirmed,
    /// A different action was pending; both are dropped
    Cleared,
}

#[derive(Debug, Clone)]
struct Pending {
    action: ConfirmAction,
    expires_at: Instant,
}

/// Holds at most one pending confirmation
#[derive(Debug, Clone)]
pub struct ConfirmGate {
    pending: Option<Pending>,
    ttl: Duration,
    touched: bool,
}

impl ConfirmGate {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: None,
            ttl,
            touched: false,
        }
    }

    pub fn pending(&self) -> Option<&ConfirmAction> {
        self.pending.as_ref().map(|p| &p.action)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn request(&mut self, action: ConfirmAction, now: Instant) -> Request {
        self.touched = true;
        match self.pending.take() {
            Some(p) if p.action == action && now < p.expires_at => Request::Confirmed,
            Some(p) if p.action != action && now < p.expires_at => Request::Cleared,
            _ => {
                self.pending = Some(Pending {
                    action,
                    expires_at: now + self.ttl,
                });
                Request::Armed
            }
        }
    }

    /// Drop the token; returns whether one was set
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Drop an expired token; returns whether one expired
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.pending.as_ref().is_some_and(|p| now >= p.expires_at) {
            self.pending = None;
            return true;
        }
        false
    }

    /// Start tracking whether the next key handler touches the gate
    pub fn begin_key(&mut self) {
        self.touched = false;
    }

    /// Clear the token if the handler did not request anything; returns
    /// whether a token was dropped
    pub fn end_key(&mut self) -> bool {
        !self.touched && self.cancel()
    }
}
