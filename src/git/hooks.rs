//! Managed git hooks
//!
//! Three canned hooks can be installed into `<git dir>/hooks`. Two of them
//! share the `pre-commit` slot, so each script carries a marker line and a
//! hook only counts as installed when the file at its slot is ours.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{GitError, Result};

/// Executable bits applied to installed hooks
pub const HOOK_MODE: u32 = 0o755;

const MARKER_PREFIX: &str = "# gitdeck-hook: ";

const CONVENTIONAL_COMMITS: &str = r#"#!/bin/sh
# gitdeck-hook: conventional-commits
pattern='^(feat|fix|docs|style|refactor|perf|test|build|ci|chore|revert)(\([a-z0-9_./-]+\))?!?: .+'
if ! head -n 1 "$1" | grep -Eq "$pattern"; then
    echo "commit message must follow Conventional Commits: type(scope): subject" >&2
    exit 1
fi
"#;

const NO_LARGE_FILES: &str = r#"#!/bin/sh
# gitdeck-hook: no-large-files
limit=5242880
status=0
for file in $(git diff --cached --name-only --diff-filter=AM); do
    [ -f "$file" ] || continue
    size=$(wc -c < "$file")
    if [ "$size" -gt "$limit" ]; then
        echo "refusing to commit $file ($size bytes > $limit)" >&2
        status=1
    fi
done
exit $status
"#;

const DETECT_SECRETS: &str = r#"#!/bin/sh
# gitdeck-hook: detect-secrets
pattern='(AKIA[0-9A-Z]{16}|-----BEGIN [A-Z ]*PRIVATE KEY-----|(api[_-]?key|secret|password|token)[[:space:]]*[:=][[:space:]]*["'"'"'][^"'"'"']{8,})'
if git diff --cached -U0 | grep '^+' | grep -Eiq "$pattern"; then
    echo "possible secret in staged changes; commit aborted" >&2
    exit 1
fi
"#;

/// The hooks gitdeck knows how to manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookKind {
    ConventionalCommits,
    NoLargeFiles,
    DetectSecrets,
}

impl HookKind {
    pub const ALL: [HookKind; 3] = [
        HookKind::ConventionalCommits,
        HookKind::NoLargeFiles,
        HookKind::DetectSecrets,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            HookKind::ConventionalCommits => "conventional-commits",
            HookKind::NoLargeFiles => "no-large-files",
            HookKind::DetectSecrets => "detect-secrets",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HookKind::ConventionalCommits => "Enforce Conventional Commits messages",
            HookKind::NoLargeFiles => "Block staged files larger than 5MB",
            HookKind::DetectSecrets => "Block commits that look like they contain secrets",
        }
    }

    /// git's name for the hook slot
    pub fn slot(&self) -> &'static str {
        match self {
            HookKind::ConventionalCommits => "commit-msg",
            HookKind::NoLargeFiles | HookKind::DetectSecrets => "pre-commit",
        }
    }

    pub fn script(&self) -> &'static str {
        match self {
            HookKind::ConventionalCommits => CONVENTIONAL_COMMITS,
            HookKind::NoLargeFiles => NO_LARGE_FILES,
            HookKind::DetectSecrets => DETECT_SECRETS,
        }
    }

    fn marker(&self) -> String {
        format!("{MARKER_PREFIX}{}", self.id())
    }

    pub fn path(&self, git_dir: &Path) -> PathBuf {
        git_dir.join("hooks").join(self.slot())
    }
}

/// Installed state of one hook kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookStatus {
    pub kind: HookKind,
    pub installed: bool,
}

/// Whether the slot for `kind` holds our script for `kind`
pub async fn is_installed(git_dir: &Path, kind: HookKind) -> bool {
    match tokio::fs::read_to_string(kind.path(git_dir)).await {
        Ok(contents) => contents.lines().any(|l| l == kind.marker()),
        Err(_) => false,
    }
}

pub async fn statuses(git_dir: &Path) -> Vec<HookStatus> {
    let mut statuses = Vec::with_capacity(HookKind::ALL.len());
    for kind in HookKind::ALL {
        statuses.push(HookStatus {
            kind,
            installed: is_installed(git_dir, kind).await,
        });
    }
    statuses
}

/// Write the hook script and mark it executable, replacing whatever was there
pub async fn install(git_dir: &Path, kind: HookKind) -> Result<()> {
    let path = kind.path(git_dir);
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(&path, kind.script()).await?;
    set_executable(&path).await?;
    info!(hook = kind.id(), path = %path.display(), "installed hook");
    Ok(())
}

/// Remove the hook, refusing to delete a script gitdeck did not write
pub async fn remove(git_dir: &Path, kind: HookKind) -> Result<()> {
    let path = kind.path(git_dir);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(GitError::Hook(format!("{} is not installed", kind.id())).into());
    }
    if !is_installed(git_dir, kind).await {
        return Err(GitError::Hook(format!(
            "{} holds a different hook; leaving it alone",
            kind.slot()
        ))
        .into());
    }
    tokio::fs::remove_file(&path).await?;
    info!(hook = kind.id(), "removed hook");
    Ok(())
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(HOOK_MODE)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
