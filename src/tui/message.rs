//! Commands the state machine asks for and the messages they resolve to
//!
//! A [`Command`] is plain data describing one operation. [`execute`] runs it
//! off the event loop and always yields exactly one [`Message`]; failures
//! become [`Message::Failed`] instead of propagating.

use std::path::PathBuf;

use tracing::warn;

use crate::git::{
    BlameLine, Branch, BranchComparison, Change, Commit, CommitDetail, CommitSummary,
    ConflictFile, GitOps, HookKind, HookStatus, RebasePlan, Stash, Status, Tag,
};

/// An operation to run against the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Loads
    LoadChanges,
    LoadStatus,
    LoadBranches,
    LoadRecentCommits,
    LoadHistory,
    LoadReflog,
    LoadFileDiff { path: String },
    LoadConflicts,
    LoadBlame { path: String },
    LoadComparison { target: String },
    LoadRebasePlan { count: String },
    LoadRebaseState,
    LoadStashes,
    LoadStashDiff { index: usize },
    LoadTags,
    LoadHooks,
    LoadLog { search: Option<String> },
    LoadCommitDetail { hash: String },
    LoadCleanCandidates,

    // Mutations
    ToggleStage { path: String },
    StageAll,
    UnstageAll,
    Discard { path: String },
    ResetLastCommit,
    Commit { message: String },
    Push,
    Pull,
    Fetch,
    SwitchBranch(Branch),
    CreateBranch { name: String },
    DeleteBranch(Branch),
    UndoTo { hash: String },
    ExecuteRebase(RebasePlan),
    AbortRebase,
    ContinueRebase,
    StashPush { message: String },
    StashPop { index: usize },
    StashApply { index: usize },
    StashDrop { index: usize },
    CreateTag { name: String, message: Option<String> },
    DeleteTag { name: String },
    PushTag { name: String },
    PushAllTags,
    ToggleHook(HookKind),
    CherryPick { hash: String },
    AbortCherryPick,
    Revert { hash: String },
    Clean,
    Clone { url: String, parent: PathBuf },
    Init { path: PathBuf },
}

impl Command {
    /// Reloads to run after this command succeeds
    pub fn follow_ups(&self) -> Vec<Command> {
        let workspace = || vec![Command::LoadChanges, Command::LoadStatus];
        let with = |extra: Command| {
            let mut reloads = workspace();
            reloads.push(extra);
            reloads
        };

        match self {
            Command::ToggleStage { .. }
            | Command::StageAll
            | Command::UnstageAll
            | Command::Discard { .. }
            | Command::StashApply { .. } => workspace(),
            Command::ResetLastCommit
            | Command::Commit { .. }
            | Command::CherryPick { .. }
            | Command::AbortCherryPick
            | Command::Revert { .. } => with(Command::LoadRecentCommits),
            Command::Push | Command::Fetch => vec![Command::LoadStatus],
            Command::Pull => with(Command::LoadBranches),
            Command::SwitchBranch(_) | Command::CreateBranch { .. } => {
                vec![Command::LoadBranches, Command::LoadStatus, Command::LoadChanges]
            }
            Command::DeleteBranch(_) => vec![Command::LoadBranches],
            Command::UndoTo { .. }
            | Command::ExecuteRebase(_)
            | Command::AbortRebase
            | Command::ContinueRebase => {
                let mut reloads = with(Command::LoadHistory);
                reloads.push(Command::LoadRebaseState);
                reloads
            }
            Command::StashPush { .. } | Command::StashPop { .. } => {
                vec![Command::LoadStashes, Command::LoadChanges, Command::LoadStatus]
            }
            Command::StashDrop { .. } => vec![Command::LoadStashes],
            Command::CreateTag { .. }
            | Command::DeleteTag { .. }
            | Command::PushTag { .. }
            | Command::PushAllTags => vec![Command::LoadTags],
            Command::ToggleHook(_) => vec![Command::LoadHooks],
            Command::Clean => {
                vec![Command::LoadCleanCandidates, Command::LoadChanges, Command::LoadStatus]
            }
            _ => Vec::new(),
        }
    }

    /// Whether this command sits behind the two-press confirmation
    pub fn is_guarded(&self) -> bool {
        matches!(
            self,
            Command::Discard { .. }
                | Command::ResetLastCommit
                | Command::DeleteBranch(_)
                | Command::Push
                | Command::Pull
                | Command::UndoTo { .. }
                | Command::ExecuteRebase(_)
                | Command::StashPop { .. }
                | Command::StashDrop { .. }
                | Command::DeleteTag { .. }
                | Command::Revert { .. }
                | Command::Clean
        )
    }
}

/// Result of one executed [`Command`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Changes(Vec<Change>),
    Status(Status),
    Branches(Vec<Branch>),
    RecentCommits(Vec<Commit>),
    History(Vec<Commit>),
    Reflog(Vec<Commit>),
    FileDiff { path: String, diff: String },
    Conflicts(Vec<ConflictFile>),
    Blame { path: String, lines: Vec<BlameLine> },
    Comparison(BranchComparison),
    RebasePlan(RebasePlan),
    RebaseInProgress(bool),
    Stashes(Vec<Stash>),
    StashDiff { index: usize, diff: String },
    Tags(Vec<Tag>),
    Hooks(Vec<HookStatus>),
    Log(Vec<Commit>),
    CommitDetail { detail: CommitDetail, diff: String },
    CleanCandidates(Vec<String>),
    Committed(CommitSummary),
    RepoSwitched(PathBuf),
    /// A mutation succeeded; `status` is shown to the user
    Done { command: Command, status: String },
    /// Any command failed; `error` is the text to show
    Failed { command: Command, error: String },
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn rebased(plan: &RebasePlan) -> String {
    let status = format!("Rebased {}", plural(plan.len(), "commit"));
    match plan.rewords() {
        0 => status,
        n => format!(
            "{status}; {} kept the old message, amend to change it",
            plural(n, "reworded commit")
        ),
    }
}

/// Run `command` and turn its outcome into a message
pub async fn execute(ops: &GitOps, command: Command) -> Message {
    match run(ops, &command).await {
        Ok(message) => message,
        Err(e) => {
            warn!(?command, error = %e, "command failed");
            Message::Failed {
                error: e.user_message(),
                command,
            }
        }
    }
}

async fn run(ops: &GitOps, command: &Command) -> crate::error::Result<Message> {
    let done = |status: String| Message::Done {
        command: command.clone(),
        status,
    };

    let message = match command {
        Command::LoadChanges => Message::Changes(ops.changes().await?),
        Command::LoadStatus => Message::Status(ops.status().await?),
        Command::LoadBranches => Message::Branches(ops.branches().await?),
        Command::LoadRecentCommits => Message::RecentCommits(ops.recent_commits().await?),
        Command::LoadHistory => Message::History(ops.history().await?),
        Command::LoadReflog => Message::Reflog(ops.reflog().await?),
        Command::LoadFileDiff { path } => Message::FileDiff {
            path: path.clone(),
            diff: ops.selected_diff(path).await?,
        },
        Command::LoadConflicts => Message::Conflicts(ops.conflicts().await?),
        Command::LoadBlame { path } => Message::Blame {
            path: path.clone(),
            lines: ops.blame(path).await?,
        },
        Command::LoadComparison { target } => Message::Comparison(ops.compare(target).await?),
        Command::LoadRebasePlan { count } => Message::RebasePlan(ops.rebase_plan(count).await?),
        Command::LoadRebaseState => Message::RebaseInProgress(ops.rebase_in_progress().await),
        Command::LoadStashes => Message::Stashes(ops.stashes().await?),
        Command::LoadStashDiff { index } => Message::StashDiff {
            index: *index,
            diff: ops.stash_diff(*index).await?,
        },
        Command::LoadTags => Message::Tags(ops.tags().await?),
        Command::LoadHooks => Message::Hooks(ops.hooks().await),
        Command::LoadLog { search } => Message::Log(ops.search_log(search.as_deref()).await?),
        Command::LoadCommitDetail { hash } => {
            let (detail, diff) = ops.commit_detail(hash).await?;
            Message::CommitDetail { detail, diff }
        }
        Command::LoadCleanCandidates => Message::CleanCandidates(ops.clean_candidates().await?),

        Command::ToggleStage { path } => {
            if ops.toggle_stage(path).await? {
                done(format!("Staged {path}"))
            } else {
                done(format!("Unstaged {path}"))
            }
        }
        Command::StageAll => {
            ops.stage_all().await?;
            done("Staged all changes".to_string())
        }
        Command::UnstageAll => {
            let n = ops.unstage_all().await?;
            done(format!("Unstaged {}", plural(n, "file")))
        }
        Command::Discard { path } => {
            ops.discard(path).await?;
            done(format!("Discarded changes to {path}"))
        }
        Command::ResetLastCommit => {
            ops.reset_last_commit().await?;
            done("Reset last commit (changes kept)".to_string())
        }
        Command::Commit { message } => Message::Committed(ops.commit(message).await?),
        Command::Push => {
            let output = ops.push().await?;
            done(match first_line(&output.combined()) {
                line if line.is_empty() => "Pushed".to_string(),
                line => format!("Pushed: {line}"),
            })
        }
        Command::Pull => {
            let output = ops.pull().await?;
            done(match first_line(&output.combined()) {
                line if line.is_empty() => "Pulled".to_string(),
                line => format!("Pulled: {line}"),
            })
        }
        Command::Fetch => {
            ops.fetch().await?;
            done("Fetched".to_string())
        }
        Command::SwitchBranch(branch) => {
            ops.switch_branch(branch).await?;
            done(format!("Switched to {}", branch.local_name()))
        }
        Command::CreateBranch { name } => {
            ops.create_branch(name).await?;
            done(format!("Created and switched to branch '{}'", name.trim()))
        }
        Command::DeleteBranch(branch) => {
            ops.delete_branch(branch).await?;
            done(format!("Deleted branch {}", branch.name))
        }
        Command::UndoTo { hash } => {
            ops.undo_to(hash).await?;
            done(format!("Reset to {hash} (changes staged)"))
        }
        Command::ExecuteRebase(plan) => {
            ops.execute_rebase(plan).await?;
            done(rebased(plan))
        }
        Command::AbortRebase => {
            ops.rebase_abort().await?;
            done("Rebase aborted".to_string())
        }
        Command::ContinueRebase => {
            ops.rebase_continue().await?;
            done("Rebase continued".to_string())
        }
        Command::StashPush { message } => {
            ops.stash_push(message).await?;
            done("Changes stashed".to_string())
        }
        Command::StashPop { index } => {
            ops.stash_pop(*index).await?;
            done(format!("Popped stash@{{{index}}}"))
        }
        Command::StashApply { index } => {
            ops.stash_apply(*index).await?;
            done(format!("Applied stash@{{{index}}}"))
        }
        Command::StashDrop { index } => {
            ops.stash_drop(*index).await?;
            done(format!("Dropped stash@{{{index}}}"))
        }
        Command::CreateTag { name, message } => {
            ops.create_tag(name, message.as_deref()).await?;
            done(format!("Created tag {}", name.trim()))
        }
        Command::DeleteTag { name } => {
            ops.delete_tag(name).await?;
            done(format!("Deleted tag {name}"))
        }
        Command::PushTag { name } => {
            ops.push_tag(name).await?;
            done(format!("Pushed tag {name}"))
        }
        Command::PushAllTags => {
            ops.push_all_tags().await?;
            done("Pushed all tags".to_string())
        }
        Command::ToggleHook(kind) => {
            if ops.toggle_hook(*kind).await? {
                done(format!("Installed {} hook", kind.id()))
            } else {
                done(format!("Removed {} hook", kind.id()))
            }
        }
        Command::CherryPick { hash } => {
            ops.cherry_pick(hash).await?;
            done(format!("Cherry-picked {hash}"))
        }
        Command::AbortCherryPick => {
            ops.cherry_pick_abort().await?;
            done("Cherry-pick aborted".to_string())
        }
        Command::Revert { hash } => {
            ops.revert(hash).await?;
            done(format!("Reverted {hash}"))
        }
        Command::Clean => {
            ops.clean().await?;
            done("Removed untracked files".to_string())
        }
        Command::Clone { url, parent } => Message::RepoSwitched(ops.clone_into(url, parent).await?),
        Command::Init { path } => Message::RepoSwitched(ops.init(path).await?),
    };
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutations_reload_what_they_touch() {
        assert_eq!(
            Command::StageAll.follow_ups(),
            vec![Command::LoadChanges, Command::LoadStatus]
        );
        assert_eq!(
            Command::Commit {
                message: "x".to_string()
            }
            .follow_ups(),
            vec![
                Command::LoadChanges,
                Command::LoadStatus,
                Command::LoadRecentCommits
            ]
        );
        assert_eq!(
            Command::StashDrop { index: 0 }.follow_ups(),
            vec![Command::LoadStashes]
        );
    }

    #[test]
    fn test_loads_have_no_follow_ups() {
        for command in [
            Command::LoadChanges,
            Command::LoadTags,
            Command::LoadLog { search: None },
        ] {
            assert!(!command.is_guarded());
            assert!(command.follow_ups().is_empty());
        }
        assert!(Command::Push.is_guarded());
        assert!(!Command::Fetch.is_guarded());
    }

    #[test]
    fn test_rebase_status_mentions_kept_messages() {
        let commit = |hash: &str| crate::git::Commit {
            hash: hash.to_string(),
            message: hash.to_string(),
            author: "a".to_string(),
            date: "now".to_string(),
        };
        let mut plan = RebasePlan::from_log(vec![commit("c2"), commit("c1")]);
        assert_eq!(rebased(&plan), "Rebased 2 commits");

        plan.set_action(0, crate::git::RebaseAction::Reword);
        assert_eq!(
            rebased(&plan),
            "Rebased 2 commits; 1 reworded commit kept the old message, amend to change it"
        );
    }

    #[test]
    fn test_first_line_skips_blank_lines() {
        assert_eq!(first_line("\n  To origin\nmore"), "To origin");
        assert_eq!(first_line(""), "");
    }

    #[tokio::test]
    async fn test_failure_becomes_message() {
        let dir = tempfile::tempdir().unwrap();
        let executor = crate::git::GitExecutor::new(dir.path()).with_binary("gitdeck-no-such-git");
        let ops = GitOps::new(executor, crate::git::Limits::default());
        let message = execute(&ops, Command::LoadChanges).await;
        assert!(matches!(
            message,
            Message::Failed {
                command: Command::LoadChanges,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_input_fails_without_git() {
        let executor = crate::git::GitExecutor::new("/nonexistent").with_binary("gitdeck-no-such-git");
        let ops = GitOps::new(executor, crate::git::Limits::default());
        let message = tokio_test::block_on(execute(
            &ops,
            Command::CreateBranch {
                name: "two words".to_string(),
            },
        ));
        assert_eq!(
            message,
            Message::Failed {
                command: Command::CreateBranch {
                    name: "two words".to_string()
                },
                error: "Invalid branch name".to_string(),
            }
        );
    }
}
