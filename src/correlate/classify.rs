//! Conventional-commit subject classification
//!
//! An explicit ordered check against the fixed tag set rather than a regex,
//! so the behavior stays portable and testable in isolation.

use serde::Serialize;
use std::str::FromStr;

/// The fixed set of conventional-commit type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Test,
    Ci,
    Refactor,
    Docs,
    Chore,
    Style,
    Perf,
}

impl CommitType {
    /// Every known tag, in the order they are checked.
    pub const ALL: [CommitType; 9] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Test,
        CommitType::Ci,
        CommitType::Refactor,
        CommitType::Docs,
        CommitType::Chore,
        CommitType::Style,
        CommitType::Perf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Test => "test",
            CommitType::Ci => "ci",
            CommitType::Refactor => "refactor",
            CommitType::Docs => "docs",
            CommitType::Chore => "chore",
            CommitType::Style => "style",
            CommitType::Perf => "perf",
        }
    }
}

impl std::fmt::Display for CommitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown commit type '{s}'"))
    }
}

/// Classify a commit subject by its conventional-commit prefix.
///
/// The tag must sit at the very start of the subject and be immediately
/// followed by `(` or `:`. Anything else, including bare tags and merge
/// messages, is untyped (`None`). Pure and total; no error path.
pub fn classify(subject: &str) -> Option<CommitType> {
    for ty in CommitType::ALL {
        if let Some(rest) = subject.strip_prefix(ty.as_str()) {
            if rest.starts_with('(') || rest.starts_with(':') {
                return Some(ty);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_prefix() {
        assert_eq!(classify("feat(auth): add login"), Some(CommitType::Feat));
        assert_eq!(classify("fix(ci): flaky job"), Some(CommitType::Fix));
    }

    #[test]
    fn test_colon_prefix() {
        assert_eq!(classify("fix: bug"), Some(CommitType::Fix));
        assert_eq!(classify("perf: faster walk"), Some(CommitType::Perf));
        assert_eq!(classify("chore: bump deps"), Some(CommitType::Chore));
    }

    #[test]
    fn test_untyped_subjects() {
        assert_eq!(classify("Merge branch 'x'"), None);
        assert_eq!(classify("update readme"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_tag_requires_terminator() {
        // A bare tag or a longer word sharing the prefix is not a match
        assert_eq!(classify("feat"), None);
        assert_eq!(classify("feature: add login"), None);
        assert_eq!(classify("fix bug"), None);
    }

    #[test]
    fn test_tag_must_be_anchored() {
        assert_eq!(classify("Revert \"fix: bug\""), None);
        assert_eq!(classify(" fix: leading space"), None);
    }

    #[test]
    fn test_display_and_parse_round_trip() {
        for ty in CommitType::ALL {
            assert_eq!(ty.as_str().parse::<CommitType>().unwrap(), ty);
        }
        assert!("unknown".parse::<CommitType>().is_err());
    }
}
