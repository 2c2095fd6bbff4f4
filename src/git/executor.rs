//! Async git command executor with index.lock retry
//!
//! Provides non-blocking git command execution with:
//! - Semaphore to serialize access to one repository (default: 1 permit)
//! - A bounded retry loop around the repository's `index.lock`
//! - Child processes detached into their own process group
//! - Pluggable process runner and sleeper so retries can be tested without time

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{GitError, Result};

/// Default number of attempts before giving up on a held lock
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default first backoff delay
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(100);

/// Name of git's lock marker inside the control directory
pub const LOCK_FILE: &str = "index.lock";

/// Everything needed to spawn one git process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    /// Human-readable form used in logs and errors
    pub fn display(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

/// Raw result of one process run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Decoded output of a successful invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr, the way a terminal would show them
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        text.push_str(&self.stderr);
        text
    }
}

impl From<RawOutput> for CommandOutput {
    fn from(raw: RawOutput) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&raw.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&raw.stderr).into_owned(),
        }
    }
}

/// Spawns a process and waits for it
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<RawOutput>;
}

/// Waits between retry attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Runs real processes through `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<RawOutput> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Keep terminal signals aimed at the UI away from git and its editors.
        #[cfg(unix)]
        cmd.process_group(0);

        let output = cmd.output().await?;
        Ok(RawOutput {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry policy for lock contention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_BACKOFF,
        }
    }
}

/// Async git command executor bound to one repository
///
/// The only component that performs process I/O. Everything else consumes
/// the text it returns.
#[derive(Clone)]
pub struct GitExecutor {
    /// Working directory for every invocation
    repo_path: PathBuf,
    /// Control directory holding `index.lock`
    git_dir: PathBuf,
    /// Off when the working directory is not a repository yet
    check_lock: bool,
    /// git executable
    binary: String,
    retry: RetryPolicy,
    max_concurrent: usize,
    /// Semaphore for concurrency control
    semaphore: Arc<Semaphore>,
    runner: Arc<dyn ProcessRunner>,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for GitExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitExecutor")
            .field("repo_path", &self.repo_path)
            .field("git_dir", &self.git_dir)
            .field("binary", &self.binary)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl GitExecutor {
    /// Create an executor for `repo_path` with default settings
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        let repo_path = repo_path.into();
        Self {
            git_dir: repo_path.join(".git"),
            repo_path,
            check_lock: true,
            binary: "git".to_string(),
            retry: RetryPolicy::default(),
            max_concurrent: 1,
            semaphore: Arc::new(Semaphore::new(1)),
            runner: Arc::new(SystemRunner),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Create an executor configured from user settings
    pub fn from_config(repo_path: impl Into<PathBuf>, config: &Config) -> Self {
        Self::new(repo_path)
            .with_binary(config.git_binary.clone())
            .with_max_concurrent(config.max_concurrent_git)
            .with_retry(RetryPolicy {
                max_attempts: config.lock_max_attempts,
                initial_backoff: config.lock_backoff(),
            })
    }

    /// Same settings, different repository (fresh semaphore)
    pub fn for_repo(&self, repo_path: impl Into<PathBuf>) -> Self {
        let repo_path = repo_path.into();
        Self {
            git_dir: repo_path.join(".git"),
            repo_path,
            check_lock: true,
            semaphore: Arc::new(Semaphore::new(self.max_concurrent)),
            ..self.clone()
        }
    }

    /// Same settings, running in a plain directory (a clone parent or an
    /// init target) where there is no index lock to wait for
    pub fn outside_repo(&self, dir: impl Into<PathBuf>) -> Self {
        Self {
            check_lock: false,
            ..self.for_repo(dir)
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self.semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_git_dir(mut self, git_dir: impl Into<PathBuf>) -> Self {
        self.git_dir = git_dir.into();
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Path of the lock marker checked before every attempt
    pub fn lock_path(&self) -> PathBuf {
        self.git_dir.join(LOCK_FILE)
    }

    /// Check if git is installed and accessible
    pub async fn check_installed(&self) -> Result<()> {
        let invocation = self.invocation(&["--version"], &[]);
        match self.runner.run(&invocation).await {
            Ok(raw) if raw.success => {
                let version = String::from_utf8_lossy(&raw.stdout);
                debug!("git version: {}", version.trim());
                Ok(())
            }
            _ => Err(GitError::NotInstalled.into()),
        }
    }

    /// Ask git for the control directory and work-tree root and remember
    /// both, so paths from porcelain output resolve from any subdirectory.
    ///
    /// Fails with [`GitError::NotARepository`] outside a work tree.
    pub async fn discover(mut self) -> Result<Self> {
        let invocation = self.invocation(
            &["rev-parse", "--absolute-git-dir", "--show-toplevel"],
            &[],
        );
        let raw = self
            .runner
            .run(&invocation)
            .await
            .map_err(|e| GitError::Spawn(e.to_string()))?;
        if !raw.success {
            return Err(GitError::NotARepository(self.repo_path.clone()).into());
        }
        let output = CommandOutput::from(raw);
        let mut lines = output.stdout.lines().map(str::trim);
        if let Some(git_dir) = lines.next().filter(|l| !l.is_empty()) {
            self.git_dir = PathBuf::from(git_dir);
        }
        if let Some(toplevel) = lines.next().filter(|l| !l.is_empty()) {
            self.repo_path = PathBuf::from(toplevel);
        }
        Ok(self)
    }

    fn invocation(&self, args: &[&str], env: &[(&str, &str)]) -> Invocation {
        Invocation {
            program: self.binary.clone(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: self.repo_path.clone(),
            env: env
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Execute a git command and return its output
    pub async fn execute(&self, args: &[&str]) -> Result<CommandOutput> {
        self.execute_with_env(args, &[]).await
    }

    /// Execute a git command with extra environment variables.
    ///
    /// A present lock marker costs one attempt without spawning. A run that
    /// fails mentioning `index.lock` lost a race: back off, double the delay
    /// and try again. Any other failure is returned at once with git's text.
    #[instrument(skip(self, env), fields(args = ?args))]
    pub async fn execute_with_env(
        &self,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<CommandOutput> {
        // Acquire semaphore permit
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| GitError::SemaphoreError)?;

        let invocation = self.invocation(args, env);
        let lock_path = self.lock_path();
        let mut backoff = self.retry.initial_backoff;

        for attempt in 1..=self.retry.max_attempts {
            if self.check_lock && tokio::fs::try_exists(&lock_path).await.unwrap_or(false) {
                warn!(attempt, ?backoff, "index.lock present, waiting");
                self.sleeper.sleep(backoff).await;
                continue;
            }

            let raw = self.runner.run(&invocation).await.map_err(|e| {
                warn!("failed to spawn {}: {}", invocation.program, e);
                if e.kind() == std::io::ErrorKind::NotFound {
                    GitError::NotInstalled
                } else {
                    GitError::Spawn(e.to_string())
                }
            })?;
            let success = raw.success;
            let output = CommandOutput::from(raw);

            if success {
                debug!(attempt, "git command succeeded");
                return Ok(output);
            }

            let combined = output.combined();
            if combined.contains(LOCK_FILE) {
                warn!(attempt, ?backoff, "lost index.lock race, retrying");
                self.sleeper.sleep(backoff).await;
                backoff *= 2;
                continue;
            }

            debug!(attempt, "git command failed: {}", combined.trim());
            return Err(GitError::CommandFailed {
                command: invocation.display(),
                output: combined,
            }
            .into());
        }

        Err(GitError::LockContention {
            attempts: self.retry.max_attempts,
        }
        .into())
    }

    /// Execute and return stdout only
    pub async fn stdout(&self, args: &[&str]) -> Result<String> {
        Ok(self.execute(args).await?.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::Error;

    /// Replays scripted results and counts spawns
    struct ScriptedRunner {
        results: Mutex<Vec<RawOutput>>,
        spawns: AtomicUsize,
    }

    impl ScriptedRunner {
        fn new(mut results: Vec<RawOutput>) -> Arc<Self> {
            results.reverse();
            Arc::new(Self {
                results: Mutex::new(results),
                spawns: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn run(&self, _invocation: &Invocation) -> std::io::Result<RawOutput> {
            self.spawns.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.lock().unwrap().pop().unwrap_or_default())
        }
    }

    /// Records sleeps; optionally removes the lock file on the first one
    struct RecordingSleeper {
        sleeps: Mutex<Vec<Duration>>,
        release_lock: Option<PathBuf>,
    }

    impl RecordingSleeper {
        fn new(release_lock: Option<PathBuf>) -> Arc<Self> {
            Arc::new(Self {
                sleeps: Mutex::new(Vec::new()),
                release_lock,
            })
        }

        fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
            if let Some(lock) = &self.release_lock {
                let _ = std::fs::remove_file(lock);
            }
        }
    }

    fn ok(stdout: &str) -> RawOutput {
        RawOutput {
            success: true,
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }
    }

    fn failed(stderr: &str) -> RawOutput {
        RawOutput {
            success: false,
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    fn repo_with_git_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_lock_present_then_released() {
        let dir = repo_with_git_dir();
        let lock = dir.path().join(".git").join(LOCK_FILE);
        std::fs::write(&lock, "").unwrap();

        let runner = ScriptedRunner::new(vec![ok("done\n")]);
        let sleeper = RecordingSleeper::new(Some(lock.clone()));
        let executor = GitExecutor::new(dir.path())
            .with_runner(runner.clone())
            .with_sleeper(sleeper.clone());

        let output = executor.execute(&["status"]).await.unwrap();
        assert_eq!(output.stdout, "done\n");
        assert_eq!(sleeper.sleeps(), vec![DEFAULT_BACKOFF]);
        assert_eq!(runner.spawns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lost_race_doubles_backoff() {
        let dir = repo_with_git_dir();
        let runner = ScriptedRunner::new(vec![
            failed("fatal: Unable to create '.git/index.lock': File exists."),
            failed("fatal: Unable to create '.git/index.lock': File exists."),
            ok("ok"),
        ]);
        let sleeper = RecordingSleeper::new(None);
        let executor = GitExecutor::new(dir.path())
            .with_runner(runner.clone())
            .with_sleeper(sleeper.clone());

        executor.execute(&["add", "."]).await.unwrap();
        assert_eq!(
            sleeper.sleeps(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
        assert_eq!(runner.spawns.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_persistent_lock_is_contention() {
        let dir = repo_with_git_dir();
        std::fs::write(dir.path().join(".git").join(LOCK_FILE), "").unwrap();

        let runner = ScriptedRunner::new(vec![]);
        let sleeper = RecordingSleeper::new(None);
        let executor = GitExecutor::new(dir.path())
            .with_runner(runner.clone())
            .with_sleeper(sleeper.clone());

        let err = executor.execute(&["commit"]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Git(GitError::LockContention { attempts: 3 })
        ));
        assert_eq!(sleeper.sleeps().len(), 3);
        assert_eq!(runner.spawns.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_semantic_failure_is_not_retried() {
        let dir = repo_with_git_dir();
        let runner = ScriptedRunner::new(vec![failed("nothing to commit, working tree clean\n")]);
        let sleeper = RecordingSleeper::new(None);
        let executor = GitExecutor::new(dir.path())
            .with_runner(runner.clone())
            .with_sleeper(sleeper.clone());

        let err = executor.execute(&["commit", "-m", "x"]).await.unwrap_err();
        match err {
            Error::Git(GitError::CommandFailed { command, output }) => {
                assert_eq!(command, "git commit -m x");
                assert_eq!(output, "nothing to commit, working tree clean\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(sleeper.sleeps().is_empty());
        assert_eq!(runner.spawns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_combined_output_order() {
        let output = CommandOutput {
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
        };
        assert_eq!(output.combined(), "out\nerr\n");
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = Config {
            lock_max_attempts: 5,
            lock_backoff_ms: 10,
            git_binary: "/usr/bin/git".to_string(),
            ..Config::default()
        };
        let executor = GitExecutor::from_config("/tmp/repo", &config);
        assert_eq!(executor.retry.max_attempts, 5);
        assert_eq!(executor.retry.initial_backoff, Duration::from_millis(10));
        assert_eq!(executor.binary, "/usr/bin/git");
        assert_eq!(executor.lock_path(), PathBuf::from("/tmp/repo/.git/index.lock"));
    }

    #[test]
    fn test_for_repo_keeps_settings() {
        let executor = GitExecutor::new("/a").with_binary("g");
        let other = executor.for_repo("/b");
        assert_eq!(other.repo_path(), Path::new("/b"));
        assert_eq!(other.git_dir(), Path::new("/b/.git"));
        assert_eq!(other.binary, "g");
    }

    #[tokio::test]
    async fn test_outside_repo_ignores_lock_marker() {
        let dir = repo_with_git_dir();
        std::fs::write(dir.path().join(".git").join(LOCK_FILE), "").unwrap();

        let runner = ScriptedRunner::new(vec![ok("")]);
        let sleeper = RecordingSleeper::new(None);
        let executor = GitExecutor::new("/elsewhere")
            .with_runner(runner.clone())
            .with_sleeper(sleeper.clone())
            .outside_repo(dir.path());

        executor.execute(&["init"]).await.unwrap();
        assert!(sleeper.sleeps().is_empty());
        assert_eq!(runner.spawns.load(Ordering::SeqCst), 1);
        assert_eq!(executor.repo_path(), dir.path());

        // Re-entering the directory as a repository checks the lock again
        assert!(executor.for_repo(dir.path()).check_lock);
    }
}
