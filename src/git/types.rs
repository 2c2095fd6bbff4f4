//! Records produced by the output parsers
//!
//! Every record here is plain data: built from git's text output, replaced
//! wholesale on reload, never mutated in place by the UI.

use serde::Serialize;

/// Characters allowed in either column of a porcelain status code
pub const STATUS_ALPHABET: [char; 7] = [' ', 'M', 'A', 'D', 'R', '?', 'U'];

/// Two-column porcelain status code (index column, worktree column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StatusCode {
    pub index: char,
    pub worktree: char,
}

impl StatusCode {
    /// Parse the first two characters of a porcelain line.
    ///
    /// Typechange and copy markers are folded into the fixed alphabet
    /// (`T` reads as `M`, `C` as `A`); anything else is rejected.
    pub fn parse(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let index = Self::normalize(chars.next()?)?;
        let worktree = Self::normalize(chars.next()?)?;
        Some(Self { index, worktree })
    }

    fn normalize(c: char) -> Option<char> {
        let c = match c {
            'T' => 'M',
            'C' => 'A',
            other => other,
        };
        STATUS_ALPHABET.contains(&c).then_some(c)
    }

    /// Whether the index column records a change
    pub fn is_staged(&self) -> bool {
        self.index != ' ' && self.index != '?'
    }

    /// Whether the worktree column records a change
    pub fn is_unstaged(&self) -> bool {
        self.worktree != ' '
    }

    pub fn is_untracked(&self) -> bool {
        self.index == '?' && self.worktree == '?'
    }

    pub fn is_conflicted(&self) -> bool {
        self.index == 'U'
            || self.worktree == 'U'
            || (self.index == 'A' && self.worktree == 'A')
            || (self.index == 'D' && self.worktree == 'D')
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.index, self.worktree)
    }
}

/// What kind of change a file carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Modified,
    Added,
    Deleted,
    Renamed,
    Untracked,
    Conflicted,
}

impl ChangeKind {
    pub fn from_code(code: StatusCode) -> Self {
        if code.is_conflicted() {
            return ChangeKind::Conflicted;
        }
        if code.is_untracked() {
            return ChangeKind::Untracked;
        }
        // The index column wins when both columns carry a change.
        let column = if code.index != ' ' { code.index } else { code.worktree };
        match column {
            'A' => ChangeKind::Added,
            'D' => ChangeKind::Deleted,
            'R' => ChangeKind::Renamed,
            _ => ChangeKind::Modified,
        }
    }
}

/// Conventional-commit category used to build commit suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitCategory {
    Feat,
    Refactor,
    Test,
    Docs,
    Chore,
}

impl CommitCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitCategory::Feat => "feat",
            CommitCategory::Refactor => "refactor",
            CommitCategory::Test => "test",
            CommitCategory::Docs => "docs",
            CommitCategory::Chore => "chore",
        }
    }

    /// Infer a category from the file path first, then the status code
    pub fn infer(path: &str, code: StatusCode) -> Self {
        let lower = path.to_lowercase();
        let file_name = lower.rsplit('/').next().unwrap_or(&lower);

        if lower.contains("test") {
            CommitCategory::Test
        } else if lower.ends_with(".md") || lower.contains("doc") {
            CommitCategory::Docs
        } else if lower.contains("config")
            || file_name.starts_with('.')
            || file_name == "makefile"
            || file_name == "dockerfile"
        {
            CommitCategory::Chore
        } else if code.index == 'A' && code.worktree == ' ' {
            CommitCategory::Feat
        } else if code.index == 'M' || code.worktree == 'M' {
            CommitCategory::Refactor
        } else {
            CommitCategory::Chore
        }
    }
}

/// One changed path from `git status --porcelain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// Path as reported (for renames: `old -> new`)
    pub path: String,
    pub code: StatusCode,
    pub kind: ChangeKind,
    pub category: CommitCategory,
}

impl Change {
    pub fn new(path: impl Into<String>, code: StatusCode) -> Self {
        let path = path.into();
        let category = CommitCategory::infer(&path, code);
        Self {
            kind: ChangeKind::from_code(code),
            code,
            category,
            path,
        }
    }

    /// Path to pass to git commands (the destination of a rename)
    pub fn target_path(&self) -> &str {
        match self.path.split_once(" -> ") {
            Some((_, to)) => to,
            None => &self.path,
        }
    }

    pub fn is_staged(&self) -> bool {
        self.code.is_staged()
    }
}

/// What the bracketed tracking annotation said
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "raw", rename_all = "lowercase")]
pub enum Divergence {
    /// No annotation at all (no upstream, or in sync)
    #[default]
    None,
    /// `ahead N` / `behind M` were read; counts live on the owning record
    Tracked,
    /// The upstream branch no longer exists
    Gone,
    /// An annotation was present but not understood
    Unparsed(String),
}

/// Repository summary for the header line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Status {
    pub branch: String,
    pub clean: bool,
    pub staged: usize,
    pub unstaged: usize,
    pub ahead: u32,
    pub behind: u32,
    pub divergence: Divergence,
}

/// A local or remote branch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Branch {
    pub name: String,
    pub is_current: bool,
    pub is_remote: bool,
    pub upstream: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub divergence: Divergence,
}

impl Branch {
    /// Local name a remote branch would be checked out as (`origin/x` -> `x`)
    pub fn local_name(&self) -> &str {
        if self.is_remote {
            self.name.split_once('/').map_or(&self.name, |(_, rest)| rest)
        } else {
            &self.name
        }
    }
}

/// One entry of `git log` or `git reflog`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    /// Empty for reflog entries
    pub author: String,
    pub date: String,
}

/// Expanded view of one commit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CommitDetail {
    pub hash: String,
    pub subject: String,
    pub body: String,
    pub author: String,
    pub email: String,
    pub date: String,
    pub files: Vec<String>,
    pub insertions: u32,
    pub deletions: u32,
}

/// Shown after a successful commit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CommitSummary {
    pub hash: String,
    pub message: String,
    pub files: Vec<String>,
    pub diff: String,
}

/// One annotated line of `git blame`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameLine {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub line_number: usize,
    pub content: String,
}

/// One stash entry; `index` is its current position and shifts on pop/drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stash {
    pub index: usize,
    pub message: String,
    pub date: String,
}

impl Stash {
    /// Selector understood by `git stash <verb>`
    pub fn selector(&self) -> String {
        format!("stash@{{{}}}", self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub annotated: bool,
    pub date: String,
    /// Short hash of the tagged commit
    pub commit: String,
    /// Subject of the tag message, annotated tags only
    pub message: Option<String>,
}

/// A path git reports as unmerged; `resolved` is advisory UI state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictFile {
    pub path: String,
    pub resolved: bool,
}

/// Result of comparing HEAD against another branch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BranchComparison {
    pub target: String,
    /// Commits on HEAD that the target lacks
    pub ahead: Vec<Commit>,
    /// Commits on the target that HEAD lacks
    pub behind: Vec<Commit>,
    pub files: Vec<String>,
}
