//! Interactive rebase plans
//!
//! A plan is edited in the UI newest-first (the order `git log` shows) and
//! serialized oldest-first (the order git's todo list expects). Applying it
//! runs `git rebase -i` with `GIT_SEQUENCE_EDITOR` pointed at a copy command,
//! so git reads our todo list instead of opening an editor.

use std::io::Write;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use super::executor::{CommandOutput, GitExecutor};
use super::types::Commit;
use crate::error::{GitError, Result};

/// Default upper bound for the number of commits in a plan
pub const DEFAULT_MAX_REBASE_COUNT: usize = 50;

/// What to do with one commit during the rebase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RebaseAction {
    #[default]
    Pick,
    Reword,
    Squash,
    Fixup,
    Drop,
}

impl RebaseAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RebaseAction::Pick => "pick",
            RebaseAction::Reword => "reword",
            RebaseAction::Squash => "squash",
            RebaseAction::Fixup => "fixup",
            RebaseAction::Drop => "drop",
        }
    }

    /// Key used to assign this action in the plan editor
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            'p' => Some(RebaseAction::Pick),
            'r' => Some(RebaseAction::Reword),
            's' => Some(RebaseAction::Squash),
            'f' => Some(RebaseAction::Fixup),
            'd' => Some(RebaseAction::Drop),
            _ => None,
        }
    }

    /// Whether this action folds the commit into its predecessor
    pub fn melds(&self) -> bool {
        matches!(self, RebaseAction::Squash | RebaseAction::Fixup)
    }
}

impl std::fmt::Display for RebaseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebaseCommit {
    pub hash: String,
    pub message: String,
    pub action: RebaseAction,
}

/// Commits to rewrite, newest first
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RebasePlan {
    pub commits: Vec<RebaseCommit>,
    /// The oldest entry is the root commit, so there is no `HEAD~N` base
    pub root: bool,
}

impl RebasePlan {
    /// Build a plan from `git log` output order, every commit picked
    pub fn from_log(commits: Vec<Commit>) -> Self {
        Self {
            commits: commits
                .into_iter()
                .map(|c| RebaseCommit {
                    hash: c.hash,
                    message: c.message,
                    action: RebaseAction::Pick,
                })
                .collect(),
            root: false,
        }
    }

    /// Mark the plan as reaching the first commit of the history
    pub fn reaching_root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Set the action of entry `index`; returns false when out of range
    pub fn set_action(&mut self, index: usize, action: RebaseAction) -> bool {
        match self.commits.get_mut(index) {
            Some(commit) => {
                commit.action = action;
                true
            }
            None => false,
        }
    }

    /// Reject plans git would refuse
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(GitError::Rebase("No commits to rebase".to_string()).into());
        }
        let first_kept = self
            .commits
            .iter()
            .rev()
            .find(|c| c.action != RebaseAction::Drop);
        if first_kept.is_some_and(|c| c.action.melds()) {
            return Err(GitError::Rebase(
                "Cannot squash or fixup the oldest commit".to_string(),
            )
            .into());
        }
        Ok(())
    }

    /// Entries that keep their current message when applied
    pub fn rewords(&self) -> usize {
        self.commits
            .iter()
            .filter(|c| c.action == RebaseAction::Reword)
            .count()
    }

    /// Upstream argument for `git rebase -i`
    pub fn base(&self) -> String {
        if self.root {
            "--root".to_string()
        } else {
            format!("HEAD~{}", self.len())
        }
    }

    /// Todo-list body: one `action hash message` line per commit, oldest first
    pub fn script(&self) -> String {
        self.commits
            .iter()
            .rev()
            .map(|c| format!("{} {} {}\n", c.action, c.hash, c.message))
            .collect()
    }
}

/// Check a user-entered commit count
pub fn parse_rebase_count(input: &str, max: usize) -> std::result::Result<usize, String> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(format!("Invalid count (1-{max})")),
    }
}

/// Hands a plan to git
#[async_trait]
pub trait PlanApplier: Send + Sync {
    async fn apply(&self, plan: &RebasePlan) -> Result<CommandOutput>;
}

/// Applies plans through `GIT_SEQUENCE_EDITOR`
pub struct SequenceEditorApplier {
    executor: GitExecutor,
}

impl SequenceEditorApplier {
    pub fn new(executor: GitExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl PlanApplier for SequenceEditorApplier {
    async fn apply(&self, plan: &RebasePlan) -> Result<CommandOutput> {
        plan.validate()?;

        let mut todo = tempfile::Builder::new()
            .prefix("gitdeck-rebase-")
            .suffix(".txt")
            .tempfile()?;
        todo.write_all(plan.script().as_bytes())?;
        todo.flush()?;

        let editor = format!("cp '{}'", todo.path().display());
        let base = plan.base();
        debug!(todo = %todo.path().display(), %base, "applying rebase plan");

        // No editor runs: reword keeps the message, squash joins both.
        let output = self
            .executor
            .execute_with_env(
                &["rebase", "-i", &base],
                &[("GIT_SEQUENCE_EDITOR", &editor), ("GIT_EDITOR", "true")],
            )
            .await?;

        info!(commits = plan.len(), "rebase plan applied");
        Ok(output)
    }
}
