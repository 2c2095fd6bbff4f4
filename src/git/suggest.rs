//! Commit message suggestions derived from the current changes

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{Change, CommitCategory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSuggestion {
    pub category: CommitCategory,
    pub message: String,
}

fn describe(category: CommitCategory) -> &'static str {
    match category {
        CommitCategory::Feat => "add new feature",
        CommitCategory::Refactor => "improve code structure",
        CommitCategory::Test => "add/update tests",
        CommitCategory::Docs => "update documentation",
        CommitCategory::Chore => "update build/config",
    }
}

/// One suggestion per category present, in category order
pub fn suggest_commit_messages(changes: &[Change]) -> Vec<CommitSuggestion> {
    let mut counts: BTreeMap<CommitCategory, usize> = BTreeMap::new();
    for change in changes {
        *counts.entry(change.category).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(category, count)| {
            let noun = if count == 1 { "file" } else { "files" };
            CommitSuggestion {
                category,
                message: format!("{}: {} ({count} {noun})", category.as_str(), describe(category)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::types::StatusCode;
    use pretty_assertions::assert_eq;

    fn change(path: &str, code: &str) -> Change {
        Change::new(path, StatusCode::parse(code).unwrap())
    }

    #[test]
    fn test_groups_by_category() {
        let changes = vec![
            change("src/new.rs", "A "),
            change("tests/parser_test.rs", " M"),
            change("tests/other_test.rs", "??"),
            change("README.md", " M"),
        ];
        let messages: Vec<String> = suggest_commit_messages(&changes)
            .into_iter()
            .map(|s| s.message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "feat: add new feature (1 file)",
                "test: add/update tests (2 files)",
                "docs: update documentation (1 file)",
            ]
        );
    }

    #[test]
    fn test_no_changes_no_suggestions() {
        assert!(suggest_commit_messages(&[]).is_empty());
    }
}
