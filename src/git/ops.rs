//! Repository operations
//!
//! Each operation combines one or more executor calls with the matching
//! parser. Read operations return typed records; mutations return git's
//! output text or `()`. Input is validated before anything is spawned.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use super::executor::{CommandOutput, GitExecutor};
use super::hooks::{self, HookKind, HookStatus};
use super::parser;
use super::rebase::{PlanApplier, RebasePlan, SequenceEditorApplier, parse_rebase_count};
use super::types::{
    BlameLine, Branch, BranchComparison, Change, Commit, CommitDetail, CommitSummary,
    ConflictFile, Stash, Status, Tag,
};
use crate::config::Config;
use crate::error::{GitError, Result};

const LOG_FORMAT: &str = "--pretty=format:%h|%s|%an|%ar";
const REFLOG_FORMAT: &str = "--pretty=format:%h|%s|%ar";
const DETAIL_FORMAT: &str = "--pretty=format:%H|%s|%b|%an|%ae|%ar";
const STASH_FORMAT: &str = "--format=%gd|%s|%ar";

/// How many entries the list-producing operations ask git for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub recent: usize,
    pub history: usize,
    pub log: usize,
    pub max_rebase: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Limits {
    fn from(config: &Config) -> Self {
        Self {
            recent: config.recent_commit_count,
            history: config.history_count,
            log: config.log_count,
            max_rebase: config.max_rebase_count,
        }
    }
}

fn invalid(message: impl Into<String>) -> crate::error::Error {
    GitError::InvalidInput(message.into()).into()
}

/// High-level git operations bound to one repository
#[derive(Debug, Clone)]
pub struct GitOps {
    executor: GitExecutor,
    limits: Limits,
}

impl GitOps {
    pub fn new(executor: GitExecutor, limits: Limits) -> Self {
        Self { executor, limits }
    }

    pub fn executor(&self) -> &GitExecutor {
        &self.executor
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn repo_path(&self) -> &Path {
        self.executor.repo_path()
    }

    /// Same settings, another repository
    pub async fn for_repo(&self, repo_path: impl Into<PathBuf>) -> Result<Self> {
        let executor = self.executor.for_repo(repo_path).discover().await?;
        Ok(Self::new(executor, self.limits))
    }

    // Workspace

    pub async fn changes(&self) -> Result<Vec<Change>> {
        let out = self.executor.stdout(&["status", "--porcelain"]).await?;
        Ok(parser::parse_changes(&out))
    }

    /// Status summary from a single `status --porcelain -b` run
    pub async fn status(&self) -> Result<Status> {
        let out = self.executor.stdout(&["status", "--porcelain", "-b"]).await?;
        let (header, entries): (Vec<&str>, Vec<&str>) =
            out.lines().partition(|l| l.starts_with("## "));
        Ok(parser::parse_status(&entries.join("\n"), &header.join("\n")))
    }

    pub async fn staged_files(&self) -> Result<Vec<String>> {
        let out = self
            .executor
            .stdout(&["diff", "--cached", "--name-only"])
            .await?;
        Ok(parser::parse_name_list(&out))
    }

    pub async fn is_staged(&self, path: &str) -> Result<bool> {
        Ok(self.staged_files().await?.iter().any(|f| f == path))
    }

    /// Stage the path, or unstage it when it already is
    #[instrument(skip(self))]
    pub async fn toggle_stage(&self, path: &str) -> Result<bool> {
        if self.is_staged(path).await? {
            self.executor.execute(&["reset", "-q", "HEAD", "--", path]).await?;
            Ok(false)
        } else {
            self.executor.execute(&["add", "--", path]).await?;
            Ok(true)
        }
    }

    pub async fn stage_all(&self) -> Result<()> {
        self.executor.execute(&["add", "."]).await?;
        Ok(())
    }

    pub async fn unstage_all(&self) -> Result<usize> {
        let staged = self.staged_files().await?;
        if staged.is_empty() {
            return Err(invalid("No staged files to unstage"));
        }
        self.executor.execute(&["reset", "-q", "HEAD"]).await?;
        Ok(staged.len())
    }

    /// Drop working-tree changes to one path
    pub async fn discard(&self, path: &str) -> Result<()> {
        self.executor.execute(&["checkout", "--", path]).await?;
        Ok(())
    }

    /// Undo the last commit, keeping its changes in the working tree
    pub async fn reset_last_commit(&self) -> Result<()> {
        self.executor.execute(&["reset", "HEAD~1"]).await?;
        Ok(())
    }

    pub async fn file_diff(&self, path: &str, staged: bool) -> Result<String> {
        if staged {
            self.executor.stdout(&["diff", "--cached", "--", path]).await
        } else {
            self.executor.stdout(&["diff", "--", path]).await
        }
    }

    /// Diff for a path, staged when the path is in the index
    pub async fn selected_diff(&self, path: &str) -> Result<String> {
        let staged = self.is_staged(path).await?;
        self.file_diff(path, staged).await
    }

    pub async fn conflicts(&self) -> Result<Vec<ConflictFile>> {
        let out = self
            .executor
            .stdout(&["diff", "--name-only", "--diff-filter=U"])
            .await?;
        Ok(parser::parse_name_list(&out)
            .into_iter()
            .map(|path| ConflictFile {
                path,
                resolved: false,
            })
            .collect())
    }

    pub async fn blame(&self, path: &str) -> Result<Vec<BlameLine>> {
        let out = self
            .executor
            .stdout(&["blame", "--porcelain", "--", path])
            .await?;
        Ok(parser::parse_blame(&out))
    }

    // Commit

    #[instrument(skip(self))]
    pub async fn commit(&self, message: &str) -> Result<CommitSummary> {
        let message = message.trim();
        if message.is_empty() {
            return Err(invalid("Commit message is empty"));
        }
        let files = self.staged_files().await?;
        if files.is_empty() {
            return Err(invalid("No files staged for commit"));
        }
        let diff = self.executor.stdout(&["diff", "--cached"]).await?;

        self.executor.execute(&["commit", "-m", message]).await?;
        let hash = self
            .executor
            .stdout(&["rev-parse", "--short", "HEAD"])
            .await?
            .trim()
            .to_string();

        info!(%hash, files = files.len(), "committed");
        Ok(CommitSummary {
            hash,
            message: message.to_string(),
            files,
            diff,
        })
    }

    pub async fn recent_commits(&self) -> Result<Vec<Commit>> {
        self.log(self.limits.recent, None).await
    }

    pub async fn history(&self) -> Result<Vec<Commit>> {
        self.log(self.limits.history, None).await
    }

    /// Log browser entries, optionally filtered by message
    pub async fn search_log(&self, search: Option<&str>) -> Result<Vec<Commit>> {
        self.log(self.limits.log, search).await
    }

    async fn log(&self, count: usize, search: Option<&str>) -> Result<Vec<Commit>> {
        let count = format!("-{count}");
        let grep = search
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("--grep={s}"));
        let mut args = vec!["log", count.as_str(), LOG_FORMAT];
        if let Some(grep) = &grep {
            args.push(grep);
        }
        match self.executor.stdout(&args).await {
            Ok(out) => Ok(parser::parse_log(&out)),
            // A fresh repository has no HEAD yet.
            Err(e) if is_empty_history(&e) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn reflog(&self) -> Result<Vec<Commit>> {
        let count = format!("-{}", self.limits.history);
        match self.executor.stdout(&["reflog", &count, REFLOG_FORMAT]).await {
            Ok(out) => Ok(parser::parse_reflog(&out)),
            Err(e) if is_empty_history(&e) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Header and stat of a commit plus its patch
    pub async fn commit_detail(&self, hash: &str) -> Result<(CommitDetail, String)> {
        let out = self
            .executor
            .stdout(&["show", hash, DETAIL_FORMAT, "--stat"])
            .await?;
        let detail = parser::parse_commit_detail(&out).unwrap_or_else(|| CommitDetail {
            hash: hash.to_string(),
            ..Default::default()
        });
        let patch = self
            .executor
            .stdout(&["show", hash, "--pretty=format:", "--patch"])
            .await?;
        Ok((detail, patch))
    }

    /// Soft reset to `hash`, keeping everything after it staged
    pub async fn undo_to(&self, hash: &str) -> Result<()> {
        self.executor.execute(&["reset", "--soft", hash]).await?;
        Ok(())
    }

    pub async fn cherry_pick(&self, hash: &str) -> Result<()> {
        self.executor.execute(&["cherry-pick", hash]).await?;
        Ok(())
    }

    pub async fn cherry_pick_abort(&self) -> Result<()> {
        self.executor.execute(&["cherry-pick", "--abort"]).await?;
        Ok(())
    }

    pub async fn revert(&self, hash: &str) -> Result<()> {
        self.executor.execute(&["revert", "--no-edit", hash]).await?;
        Ok(())
    }

    // Remote

    pub async fn push(&self) -> Result<CommandOutput> {
        self.executor.execute(&["push"]).await
    }

    pub async fn pull(&self) -> Result<CommandOutput> {
        self.executor.execute(&["pull"]).await
    }

    pub async fn fetch(&self) -> Result<CommandOutput> {
        self.executor.execute(&["fetch"]).await
    }

    // Branches

    /// Local branches followed by remote ones
    pub async fn branches(&self) -> Result<Vec<Branch>> {
        let local = self.executor.stdout(&["branch", "-vv"]).await?;
        let remote = self.executor.stdout(&["branch", "-r"]).await?;
        let mut branches = parser::parse_branches(&local);
        branches.extend(parser::parse_remote_branches(&remote));
        Ok(branches)
    }

    /// Check out a branch; a remote branch gets a local tracking branch
    #[instrument(skip(self, branch), fields(branch = %branch.name))]
    pub async fn switch_branch(&self, branch: &Branch) -> Result<()> {
        if !branch.is_remote {
            self.executor.execute(&["checkout", &branch.name]).await?;
            return Ok(());
        }
        let local = branch.local_name();
        match self
            .executor
            .execute(&["checkout", "-b", local, &branch.name])
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.git_output().is_some_and(|o| o.contains("already exists")) => {
                debug!(local, "local branch exists, checking it out");
                self.executor.execute(&["checkout", local]).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn create_branch(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(invalid("Invalid branch name"));
        }
        self.executor.execute(&["checkout", "-b", name]).await?;
        Ok(())
    }

    pub async fn delete_branch(&self, branch: &Branch) -> Result<()> {
        if branch.is_current {
            return Err(invalid("Cannot delete the current branch"));
        }
        if branch.is_remote {
            return Err(invalid("Cannot delete a remote branch"));
        }
        self.executor.execute(&["branch", "-d", &branch.name]).await?;
        Ok(())
    }

    /// Compare HEAD with `target` using three independent invocations
    pub async fn compare(&self, target: &str) -> Result<BranchComparison> {
        let ahead_range = format!("{target}..HEAD");
        let behind_range = format!("HEAD..{target}");
        let files_range = format!("{target}...HEAD");

        let ahead = self.executor.stdout(&["log", LOG_FORMAT, &ahead_range]).await?;
        let behind = self.executor.stdout(&["log", LOG_FORMAT, &behind_range]).await?;
        let files = self
            .executor
            .stdout(&["diff", "--name-only", &files_range])
            .await?;

        Ok(BranchComparison {
            target: target.to_string(),
            ahead: parser::parse_log(&ahead),
            behind: parser::parse_log(&behind),
            files: parser::parse_name_list(&files),
        })
    }

    // Rebase

    /// Validate a user-entered count and load that many commits as a plan.
    /// One extra commit is read to tell whether the plan reaches the root.
    pub async fn rebase_plan(&self, count: &str) -> Result<RebasePlan> {
        let count = parse_rebase_count(count, self.limits.max_rebase).map_err(invalid)?;
        let mut commits = self.log(count + 1, None).await?;
        if commits.len() < count {
            return Err(GitError::Rebase(format!(
                "Only {} commits available",
                commits.len()
            ))
            .into());
        }
        let reaches_root = commits.len() == count;
        commits.truncate(count);
        let plan = RebasePlan::from_log(commits);
        Ok(if reaches_root { plan.reaching_root() } else { plan })
    }

    pub async fn execute_rebase(&self, plan: &RebasePlan) -> Result<CommandOutput> {
        SequenceEditorApplier::new(self.executor.clone())
            .apply(plan)
            .await
    }

    pub async fn rebase_abort(&self) -> Result<()> {
        self.executor.execute(&["rebase", "--abort"]).await?;
        Ok(())
    }

    pub async fn rebase_continue(&self) -> Result<()> {
        self.executor
            .execute_with_env(&["rebase", "--continue"], &[("GIT_EDITOR", "true")])
            .await?;
        Ok(())
    }

    pub async fn rebase_in_progress(&self) -> bool {
        let git_dir = self.executor.git_dir();
        for marker in ["rebase-merge", "rebase-apply"] {
            if tokio::fs::try_exists(git_dir.join(marker)).await.unwrap_or(false) {
                return true;
            }
        }
        false
    }

    // Stash

    pub async fn stashes(&self) -> Result<Vec<Stash>> {
        let out = self.executor.stdout(&["stash", "list", STASH_FORMAT]).await?;
        Ok(parser::parse_stash_list(&out))
    }

    pub async fn stash_push(&self, message: &str) -> Result<()> {
        let message = message.trim();
        if message.is_empty() {
            self.executor.execute(&["stash", "push"]).await?;
        } else {
            self.executor.execute(&["stash", "push", "-m", message]).await?;
        }
        Ok(())
    }

    pub async fn stash_pop(&self, index: usize) -> Result<()> {
        self.stash_verb("pop", index).await
    }

    pub async fn stash_apply(&self, index: usize) -> Result<()> {
        self.stash_verb("apply", index).await
    }

    pub async fn stash_drop(&self, index: usize) -> Result<()> {
        self.stash_verb("drop", index).await
    }

    async fn stash_verb(&self, verb: &str, index: usize) -> Result<()> {
        let selector = format!("stash@{{{index}}}");
        self.executor.execute(&["stash", verb, &selector]).await?;
        Ok(())
    }

    pub async fn stash_diff(&self, index: usize) -> Result<String> {
        let selector = format!("stash@{{{index}}}");
        self.executor.stdout(&["stash", "show", "-p", &selector]).await
    }

    // Tags

    pub async fn tags(&self) -> Result<Vec<Tag>> {
        let format = format!("--format={}", parser::TAG_FORMAT);
        let out = self.executor.stdout(&["tag", "-l", &format]).await?;
        Ok(parser::parse_tags(&out))
    }

    /// Create a tag; annotated when a message is given
    pub async fn create_tag(&self, name: &str, message: Option<&str>) -> Result<()> {
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(invalid("Invalid tag name"));
        }
        match message.map(str::trim).filter(|m| !m.is_empty()) {
            Some(message) => {
                self.executor
                    .execute(&["tag", "-a", name, "-m", message])
                    .await?
            }
            None => self.executor.execute(&["tag", name]).await?,
        };
        Ok(())
    }

    pub async fn delete_tag(&self, name: &str) -> Result<()> {
        self.executor.execute(&["tag", "-d", name]).await?;
        Ok(())
    }

    pub async fn push_tag(&self, name: &str) -> Result<()> {
        self.executor.execute(&["push", "origin", name]).await?;
        Ok(())
    }

    pub async fn push_all_tags(&self) -> Result<()> {
        self.executor.execute(&["push", "--tags"]).await?;
        Ok(())
    }

    // Hooks

    pub async fn hooks(&self) -> Vec<HookStatus> {
        hooks::statuses(self.executor.git_dir()).await
    }

    /// Install the hook when absent, remove it when present; returns the new state
    pub async fn toggle_hook(&self, kind: HookKind) -> Result<bool> {
        let git_dir = self.executor.git_dir();
        if hooks::is_installed(git_dir, kind).await {
            hooks::remove(git_dir, kind).await?;
            Ok(false)
        } else {
            hooks::install(git_dir, kind).await?;
            Ok(true)
        }
    }

    // Clean

    pub async fn clean_candidates(&self) -> Result<Vec<String>> {
        let out = self.executor.stdout(&["clean", "-n", "-d"]).await?;
        Ok(parser::parse_clean_dry_run(&out))
    }

    pub async fn clean(&self) -> Result<()> {
        self.executor.execute(&["clean", "-f", "-d"]).await?;
        Ok(())
    }

    // Repositories

    /// Clone `url` into `<parent>/<name>` and return the new checkout
    #[instrument(skip(self))]
    pub async fn clone_into(&self, url: &str, parent: &Path) -> Result<PathBuf> {
        let name = repo_name_from_url(url).ok_or_else(|| invalid("Invalid repository URL"))?;
        let target = parent.join(&name);
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Err(invalid(format!("{} already exists", target.display())));
        }
        self.executor
            .outside_repo(parent)
            .execute(&["clone", url.trim(), &name])
            .await?;
        info!(path = %target.display(), "cloned repository");
        Ok(target)
    }

    /// Create `path` if needed and run `git init` inside it
    #[instrument(skip(self))]
    pub async fn init(&self, path: &Path) -> Result<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(invalid("Path is empty"));
        }
        tokio::fs::create_dir_all(path).await?;
        self.executor.outside_repo(path).execute(&["init"]).await?;
        let path = tokio::fs::canonicalize(path).await?;
        info!(path = %path.display(), "initialized repository");
        Ok(path)
    }
}

fn is_empty_history(error: &crate::error::Error) -> bool {
    error.git_output().is_some_and(|o| {
        o.contains("does not have any commits yet") || o.contains("unknown revision")
    })
}

/// Directory name `git clone` would pick for `url`
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    (!name.is_empty()).then(|| name.to_string())
}
