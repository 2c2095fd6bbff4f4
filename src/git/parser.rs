//! Text parsers for git's line-oriented output
//!
//! Every parser here is total: it never fails, it only skips lines it does
//! not understand. Given the same text it always yields the same records.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;

use super::types::{
    BlameLine, Branch, Change, Commit, CommitDetail, Divergence, Stash, StatusCode, Status, Tag,
};

/// Length of the abbreviated hashes shown in blame
pub const SHORT_HASH_LEN: usize = 7;

static INSERTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) insertions?\(\+\)").expect("valid regex"));
static DELETIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) deletions?\(-\)").expect("valid regex"));
static STAT_SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+ files? changed").expect("valid regex"));

/// Ahead/behind counts read from a tracking annotation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tracking {
    pub ahead: u32,
    pub behind: u32,
    pub divergence: Divergence,
}

/// Parse the inside of a `[...]` tracking annotation.
///
/// Understands `ahead N`, `behind M` (comma separated, either order) and
/// `gone`. Anything else is kept verbatim as [`Divergence::Unparsed`].
pub fn parse_tracking(annotation: &str) -> Tracking {
    let annotation = annotation.trim();
    if annotation.is_empty() {
        return Tracking::default();
    }
    if annotation == "gone" {
        return Tracking {
            divergence: Divergence::Gone,
            ..Default::default()
        };
    }

    let mut tracking = Tracking {
        divergence: Divergence::Tracked,
        ..Default::default()
    };
    for part in annotation.split(',') {
        let parsed = match part.trim().split_once(' ') {
            Some(("ahead", n)) => n.trim().parse().map(|n| tracking.ahead = n),
            Some(("behind", n)) => n.trim().parse().map(|n| tracking.behind = n),
            _ => return unparsed(annotation),
        };
        if parsed.is_err() {
            return unparsed(annotation);
        }
    }
    tracking
}

fn unparsed(annotation: &str) -> Tracking {
    Tracking {
        divergence: Divergence::Unparsed(annotation.to_string()),
        ..Default::default()
    }
}

/// Split `[annotation] rest` into the annotation and whatever follows it
fn leading_bracket(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix('[')?;
    let end = inner.find(']')?;
    Some((&inner[..end], &inner[end + 1..]))
}

/// Parse the `## ...` header of `git status -sb` into branch name and tracking
pub fn parse_branch_header(header: &str) -> (String, Tracking) {
    let Some(line) = header.lines().find(|l| l.starts_with("## ")) else {
        return ("unknown".to_string(), Tracking::default());
    };
    let body = &line[3..];

    let (names, annotation) = match body.find(" [") {
        Some(idx) => (&body[..idx], leading_bracket(&body[idx + 1..]).map(|(a, _)| a)),
        None => (body, None),
    };

    let names = names
        .strip_prefix("No commits yet on ")
        .or_else(|| names.strip_prefix("Initial commit on "))
        .unwrap_or(names);
    let branch = if names.starts_with("HEAD (no branch)") {
        "HEAD"
    } else {
        names.split("...").next().unwrap_or(names)
    };
    let branch = if branch.trim().is_empty() { "unknown" } else { branch.trim() };

    (
        branch.to_string(),
        annotation.map(parse_tracking).unwrap_or_default(),
    )
}

/// Build the repository summary.
///
/// `porcelain` is `git status --porcelain` output and decides cleanliness and
/// the staged/unstaged counts; `header` is `git status -sb` output and
/// supplies the branch and ahead/behind.
pub fn parse_status(porcelain: &str, header: &str) -> Status {
    let (branch, tracking) = parse_branch_header(header);
    let mut status = Status {
        branch,
        clean: porcelain.trim().is_empty(),
        ahead: tracking.ahead,
        behind: tracking.behind,
        divergence: tracking.divergence,
        ..Default::default()
    };

    for line in porcelain.lines() {
        if line.len() < 3 {
            continue;
        }
        let mut chars = line.chars();
        let (Some(index), Some(worktree)) = (chars.next(), chars.next()) else {
            continue;
        };
        if index != ' ' && index != '?' {
            status.staged += 1;
        }
        if worktree != ' ' {
            status.unstaged += 1;
        }
    }
    status
}

fn unquote(path: &str) -> &str {
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path)
}

/// Parse `git status --porcelain` into one [`Change`] per path
pub fn parse_changes(porcelain: &str) -> Vec<Change> {
    porcelain
        .lines()
        .filter_map(|line| {
            let code = StatusCode::parse(line.get(..2)?)?;
            let path = unquote(line.get(3..)?.trim());
            (!path.is_empty()).then(|| Change::new(path, code))
        })
        .collect()
}

/// Parse `git branch -vv`.
///
/// Detached-HEAD pseudo entries are skipped and only the first `*` line is
/// marked current.
pub fn parse_branches(output: &str) -> Vec<Branch> {
    let mut branches = Vec::new();
    let mut seen_current = false;

    for line in output.lines() {
        let Some(rest) = line.get(2..) else { continue };
        let rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with('(') {
            continue;
        }

        let mut split = rest.splitn(2, char::is_whitespace);
        let Some(name) = split.next() else { continue };
        let after_name = split.next().unwrap_or("").trim_start();

        // Skip the commit hash, then an optional `(worktree path)`.
        let mut after_hash = after_name
            .split_once(char::is_whitespace)
            .map_or("", |(_, r)| r)
            .trim_start();
        if after_hash.starts_with('(') {
            after_hash = after_hash
                .find(')')
                .map_or("", |end| &after_hash[end + 1..])
                .trim_start();
        }

        let is_current = line.starts_with('*') && !seen_current;
        seen_current |= is_current;

        let mut branch = Branch {
            name: name.to_string(),
            is_current,
            ..Default::default()
        };

        if let Some((annotation, _)) = leading_bracket(after_hash) {
            match annotation.split_once(':') {
                Some((upstream, rest)) => {
                    let tracking = parse_tracking(rest);
                    branch.upstream = Some(upstream.to_string());
                    branch.ahead = tracking.ahead;
                    branch.behind = tracking.behind;
                    branch.divergence = tracking.divergence;
                }
                None => branch.upstream = Some(annotation.to_string()),
            }
        }

        branches.push(branch);
    }
    branches
}

/// Parse `git branch -r`, skipping symbolic `->` aliases
pub fn parse_remote_branches(output: &str) -> Vec<Branch> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.contains("->"))
        .map(|name| Branch {
            name: name.to_string(),
            is_remote: true,
            ..Default::default()
        })
        .collect()
}

/// Parse `git log --pretty=format:%h|%s|%an|%ar`.
///
/// The hash is split off the left and author/date off the right, so a `|`
/// inside the subject survives.
pub fn parse_log(output: &str) -> Vec<Commit> {
    output
        .lines()
        .filter_map(|line| {
            let (hash, rest) = line.split_once('|')?;
            let mut tail = rest.rsplitn(3, '|');
            let date = tail.next()?;
            let author = tail.next()?;
            let message = tail.next()?;
            Some(Commit {
                hash: hash.trim().to_string(),
                message: message.to_string(),
                author: author.to_string(),
                date: date.to_string(),
            })
        })
        .filter(|c| !c.hash.is_empty())
        .collect()
}

/// Parse `git reflog --pretty=format:%h|%s|%ar`
pub fn parse_reflog(output: &str) -> Vec<Commit> {
    output
        .lines()
        .filter_map(|line| {
            let (hash, rest) = line.split_once('|')?;
            let (message, date) = rest.rsplit_once('|')?;
            Some(Commit {
                hash: hash.trim().to_string(),
                message: message.to_string(),
                author: String::new(),
                date: date.to_string(),
            })
        })
        .filter(|c| !c.hash.is_empty())
        .collect()
}

/// Read insertions/deletions from a `N files changed, ...` summary line
pub fn parse_stat_summary(line: &str) -> Option<(u32, u32)> {
    if !STAT_SUMMARY.is_match(line) {
        return None;
    }
    let count = |re: &Regex| {
        re.captures(line)
            .and_then(|c| c[1].parse().ok())
            .unwrap_or(0)
    };
    Some((count(&INSERTIONS), count(&DELETIONS)))
}

/// Parse `git show <hash> --stat --pretty=format:%H|%s|%b|%an|%ae|%ar`.
///
/// The header runs until it holds all six fields; a multi-line body is
/// joined back together. Returns `None` when no complete header is found.
pub fn parse_commit_detail(output: &str) -> Option<CommitDetail> {
    let mut lines = output.lines();
    let mut header = String::new();
    for line in lines.by_ref() {
        if !header.is_empty() {
            header.push('\n');
        }
        header.push_str(line);
        if header.matches('|').count() >= 5 {
            break;
        }
    }
    if header.matches('|').count() < 5 {
        return None;
    }

    let (hash, rest) = header.split_once('|')?;
    let mut tail = rest.rsplitn(4, '|');
    let date = tail.next()?;
    let email = tail.next()?;
    let author = tail.next()?;
    let (subject, body) = tail.next()?.split_once('|')?;

    let mut detail = CommitDetail {
        hash: hash.to_string(),
        subject: subject.to_string(),
        body: body.trim().to_string(),
        author: author.to_string(),
        email: email.to_string(),
        date: date.to_string(),
        ..Default::default()
    };

    for line in lines {
        if line.starts_with("---") {
            continue;
        }
        if let Some((insertions, deletions)) = parse_stat_summary(line) {
            detail.insertions = insertions;
            detail.deletions = deletions;
        } else if let Some((file, _)) = line.split_once('|') {
            let file = file.trim();
            if !file.is_empty() {
                detail.files.push(file.to_string());
            }
        }
    }
    Some(detail)
}

fn is_blame_header(line: &str) -> bool {
    let Some(first) = line.split_whitespace().next() else {
        return false;
    };
    !line.starts_with('\t') && first.len() >= 40 && first.chars().all(|c| c.is_ascii_hexdigit())
}

fn format_author_time(raw: &str) -> String {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Parse `git blame --porcelain`.
///
/// Porcelain output repeats a commit's metadata only on its first
/// appearance, so author and date are remembered per hash.
pub fn parse_blame(output: &str) -> Vec<BlameLine> {
    let mut lines = Vec::new();
    let mut known: HashMap<String, (String, String)> = HashMap::new();
    let mut hash = String::new();

    for line in output.lines() {
        if let Some(content) = line.strip_prefix('\t') {
            let (author, date) = known.get(&hash).cloned().unwrap_or_default();
            lines.push(BlameLine {
                hash: hash.chars().take(SHORT_HASH_LEN).collect(),
                author,
                date,
                line_number: lines.len() + 1,
                content: content.to_string(),
            });
        } else if is_blame_header(line) {
            hash = line.split_whitespace().next().unwrap_or_default().to_string();
            known.entry(hash.clone()).or_default();
        } else if let Some(author) = line.strip_prefix("author ") {
            if let Some(entry) = known.get_mut(&hash) {
                entry.0 = author.to_string();
            }
        } else if let Some(time) = line.strip_prefix("author-time ") {
            if let Some(entry) = known.get_mut(&hash) {
                entry.1 = format_author_time(time);
            }
        }
    }
    lines
}

/// Parse `git stash list --format=%gd|%s|%ar`
pub fn parse_stash_list(output: &str) -> Vec<Stash> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .filter_map(|(position, line)| {
            let (selector, rest) = line.split_once('|')?;
            let (message, date) = rest.rsplit_once('|')?;
            let index = selector
                .trim()
                .strip_prefix("stash@{")
                .and_then(|s| s.strip_suffix('}'))
                .and_then(|n| n.parse().ok())
                .unwrap_or(position);
            Some(Stash {
                index,
                message: message.to_string(),
                date: date.to_string(),
            })
        })
        .collect()
}

/// Format string for [`parse_tags`]
pub const TAG_FORMAT: &str = "%(refname:short)|%(objecttype)|%(creatordate:relative)|\
%(if)%(*objectname)%(then)%(*objectname:short)%(else)%(objectname:short)%(end)|\
%(contents:subject)";

/// Parse `git tag -l --format=<TAG_FORMAT>`
pub fn parse_tags(output: &str) -> Vec<Tag> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.splitn(5, '|');
            let name = fields.next()?.trim();
            let kind = fields.next()?;
            let date = fields.next()?;
            let commit = fields.next().unwrap_or_default();
            let subject = fields.next().unwrap_or_default().trim();
            if name.is_empty() {
                return None;
            }
            let annotated = kind == "tag";
            Some(Tag {
                name: name.to_string(),
                annotated,
                date: date.to_string(),
                commit: commit.to_string(),
                message: (annotated && !subject.is_empty()).then(|| subject.to_string()),
            })
        })
        .collect()
}

/// One path per non-empty line (`--name-only` style output)
pub fn parse_name_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Parse `git clean -n -d` into the paths that would be removed
pub fn parse_clean_dry_run(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|l| l.strip_prefix("Would remove "))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_status_and_changes_scenario() {
        let porcelain = "M  a.txt\n M b.txt\n?? c.txt\n";
        let status = parse_status(porcelain, "## main");
        assert!(!status.clean);
        assert_eq!(status.staged, 1);
        assert_eq!(status.unstaged, 2);
        assert_eq!(status.branch, "main");

        let changes = parse_changes(porcelain);
        let summary: Vec<(String, String)> = changes
            .iter()
            .map(|c| (c.code.to_string(), c.path.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("M ".to_string(), "a.txt".to_string()),
                (" M".to_string(), "b.txt".to_string()),
                ("??".to_string(), "c.txt".to_string()),
            ]
        );
    }

    #[test]
    fn test_clean_status() {
        let status = parse_status("  \n", "## main...origin/main");
        assert!(status.clean);
        assert_eq!(status.staged, 0);
        assert_eq!(status.unstaged, 0);
        assert_eq!(status.divergence, Divergence::None);
    }

    #[test]
    fn test_branch_header_tracking() {
        let (branch, tracking) =
            parse_branch_header("## main...origin/main [ahead 3, behind 2]\n M x\n");
        assert_eq!(branch, "main");
        assert_eq!(tracking.ahead, 3);
        assert_eq!(tracking.behind, 2);
        assert_eq!(tracking.divergence, Divergence::Tracked);

        let (_, tracking) = parse_branch_header("## dev...origin/dev [behind 7]");
        assert_eq!((tracking.ahead, tracking.behind), (0, 7));

        let (_, tracking) = parse_branch_header("## dev...origin/dev [gone]");
        assert_eq!(tracking.divergence, Divergence::Gone);
    }

    #[test]
    fn test_branch_header_unparsed_annotation() {
        let (_, tracking) = parse_branch_header("## dev...origin/dev [diverged somehow]");
        assert_eq!(
            tracking.divergence,
            Divergence::Unparsed("diverged somehow".to_string())
        );
        assert_eq!((tracking.ahead, tracking.behind), (0, 0));
    }

    #[test]
    fn test_branch_header_special_forms() {
        assert_eq!(parse_branch_header("## No commits yet on main").0, "main");
        assert_eq!(parse_branch_header("## HEAD (no branch)").0, "HEAD");
        assert_eq!(parse_branch_header("").0, "unknown");
    }

    #[test]
    fn test_changes_skip_short_and_unknown_lines() {
        let changes = parse_changes("M\n!! ignored.txt\nXY bad\nR  old.rs -> new.rs\n");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].target_path(), "new.rs");
    }

    #[test]
    fn test_changes_unquote_paths() {
        let changes = parse_changes("?? \"with space.txt\"\n");
        assert_eq!(changes[0].path, "with space.txt");
    }

    #[test]
    fn test_parse_branches() {
        let output = "\
* main       1a2b3c4 [origin/main: ahead 1, behind 2] Fix [bracket] parsing
  feature    5d6e7f8 [origin/feature] Add feature
  stale      9a8b7c6 [origin/stale: gone] Old work
  local      0f0f0f0 No upstream [not an annotation]
";
        let branches = parse_branches(output);
        assert_eq!(branches.len(), 4);

        assert_eq!(branches[0].name, "main");
        assert!(branches[0].is_current);
        assert_eq!(branches[0].upstream.as_deref(), Some("origin/main"));
        assert_eq!((branches[0].ahead, branches[0].behind), (1, 2));

        assert_eq!(branches[1].upstream.as_deref(), Some("origin/feature"));
        assert_eq!(branches[1].divergence, Divergence::None);
        assert!(!branches[1].is_current);

        assert_eq!(branches[2].divergence, Divergence::Gone);

        assert_eq!(branches[3].upstream, None);
    }

    #[test]
    fn test_parse_branches_skips_detached_and_worktree_paths() {
        let output = "\
* (HEAD detached at 1a2b3c4) 1a2b3c4 Detached
+ other      5d6e7f8 (/tmp/wt) [origin/other: ahead 4] Elsewhere
  main       9a8b7c6 Work
";
        let branches = parse_branches(output);
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].name, "other");
        assert!(!branches[0].is_current);
        assert_eq!(branches[0].ahead, 4);
        assert!(branches.iter().all(|b| !b.is_current));
    }

    #[test]
    fn test_parse_remote_branches() {
        let output = "  origin/HEAD -> origin/main\n  origin/main\n  origin/dev\n";
        let names: Vec<_> = parse_remote_branches(output)
            .into_iter()
            .map(|b| (b.name, b.is_remote))
            .collect();
        assert_eq!(
            names,
            vec![("origin/main".to_string(), true), ("origin/dev".to_string(), true)]
        );
    }

    #[test]
    fn test_parse_log() {
        let output = "abc1234|Fix a | b handling|Jane Doe|2 hours ago\nbad line\ndef5678|Init|John|3 days ago";
        let commits = parse_log(output);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].message, "Fix a | b handling");
        assert_eq!(commits[0].author, "Jane Doe");
        assert_eq!(commits[0].date, "2 hours ago");
        assert_eq!(commits[1].hash, "def5678");
    }

    #[test]
    fn test_parse_reflog() {
        let commits = parse_reflog("abc1234|commit: add x|5 minutes ago\n\n");
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "commit: add x");
        assert_eq!(commits[0].author, "");
    }

    #[test]
    fn test_parse_commit_detail() {
        let output = "\
0123456789abcdef0123456789abcdef01234567|Add parser|Longer body
second body line|Jane|jane@example.com|2 days ago
 src/parser.rs | 40 ++++++++++++++++++++++++++++++++++++++++
 src/lib.rs    |  3 ++-
 2 files changed, 42 insertions(+), 1 deletion(-)
";
        let detail = parse_commit_detail(output).unwrap();
        assert_eq!(detail.subject, "Add parser");
        assert_eq!(detail.body, "Longer body\nsecond body line");
        assert_eq!(detail.author, "Jane");
        assert_eq!(detail.email, "jane@example.com");
        assert_eq!(detail.date, "2 days ago");
        assert_eq!(detail.files, vec!["src/parser.rs", "src/lib.rs"]);
        assert_eq!((detail.insertions, detail.deletions), (42, 1));
    }

    #[test]
    fn test_parse_commit_detail_incomplete() {
        assert!(parse_commit_detail("").is_none());
        assert!(parse_commit_detail("abc|only|three").is_none());
    }

    #[test]
    fn test_stat_summary_variants() {
        assert_eq!(parse_stat_summary(" 1 file changed, 2 deletions(-)"), Some((0, 2)));
        assert_eq!(parse_stat_summary(" 3 files changed, 1 insertion(+)"), Some((1, 0)));
        assert_eq!(parse_stat_summary(" changed.rs | 2 +-"), None);
    }

    #[test]
    fn test_parse_blame() {
        let hash_a = "a".repeat(40);
        let hash_b = "b".repeat(40);
        let output = format!(
            "{hash_a} 1 1 1\nauthor Alice\nauthor-mail <{long}@example.com>\nauthor-time 1700049600\nfilename f.rs\n\tfn main() {{\n\
{hash_b} 2 2 1\nauthor Bob\nauthor-time 1700049600\nfilename f.rs\n\t    body();\n\
{hash_a} 3 3\n\t}}\n",
            long = "x".repeat(45)
        );
        let lines = parse_blame(&output);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].hash, "aaaaaaa");
        assert_eq!(lines[0].author, "Alice");
        assert_eq!(lines[0].date, "2023-11-15");
        assert_eq!(lines[0].content, "fn main() {");
        assert_eq!(lines[1].author, "Bob");
        assert_eq!(lines[1].line_number, 2);
        // Metadata for a repeated commit comes from its first block.
        assert_eq!(lines[2].author, "Alice");
        assert_eq!(lines[2].line_number, 3);
    }

    #[test]
    fn test_parse_stash_list() {
        let output = "stash@{0}|WIP on main: abc fix|2 minutes ago\nstash@{1}|On dev: spike|1 day ago\n";
        let stashes = parse_stash_list(output);
        assert_eq!(stashes.len(), 2);
        assert_eq!(stashes[1].index, 1);
        assert_eq!(stashes[0].message, "WIP on main: abc fix");
        assert_eq!(stashes[1].date, "1 day ago");
    }

    #[test]
    fn test_parse_tags() {
        let output = "v1.0|tag|3 weeks ago|abc1234|Release 1.0\nv0.9|commit|2 months ago|def5678|Some commit subject\n";
        let tags = parse_tags(output);
        assert_eq!(tags.len(), 2);
        assert!(tags[0].annotated);
        assert_eq!(tags[0].message.as_deref(), Some("Release 1.0"));
        assert!(!tags[1].annotated);
        assert_eq!(tags[1].message, None);
        assert_eq!(tags[1].commit, "def5678");
    }

    #[test]
    fn test_parse_clean_dry_run() {
        let files = parse_clean_dry_run("Would remove build/\nWould remove tmp.txt\n");
        assert_eq!(files, vec!["build/", "tmp.txt"]);
    }

    #[test]
    fn test_parse_name_list() {
        assert_eq!(parse_name_list("a.rs\n\n  b.rs  \n"), vec!["a.rs", "b.rs"]);
    }

    proptest! {
        #[test]
        fn prop_parsers_are_deterministic(input in "[ -~\n\t]{0,400}") {
            prop_assert_eq!(parse_changes(&input), parse_changes(&input));
            prop_assert_eq!(parse_branches(&input), parse_branches(&input));
            prop_assert_eq!(parse_log(&input), parse_log(&input));
            prop_assert_eq!(parse_blame(&input), parse_blame(&input));
            prop_assert_eq!(parse_status(&input, &input), parse_status(&input, &input));
        }

        #[test]
        fn prop_at_most_one_current_branch(
            lines in proptest::collection::vec(("[* ] ", "[a-z]{1,8}", "[0-9a-f]{7}"), 0..12)
        ) {
            let output: String = lines
                .iter()
                .map(|(marker, name, hash)| format!("{marker}{name} {hash} message\n"))
                .collect();
            let current = parse_branches(&output).iter().filter(|b| b.is_current).count();
            prop_assert!(current <= 1);
        }

        #[test]
        fn prop_changes_codes_within_alphabet(input in "[ MADRU?TC!X]{2} [a-z./]{0,12}(\n[ MADRU?TC!X]{2} [a-z./]{0,12}){0,8}") {
            for change in parse_changes(&input) {
                prop_assert!(crate::git::STATUS_ALPHABET.contains(&change.code.index));
                prop_assert!(crate::git::STATUS_ALPHABET.contains(&change.code.worktree));
            }
        }

        #[test]
        fn prop_clean_iff_blank(input in "[ MADRU?\n]{0,40}") {
            prop_assert_eq!(parse_status(&input, "").clean, input.trim().is_empty());
        }
    }
}
