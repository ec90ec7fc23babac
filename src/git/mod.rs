//! Commit log extraction using libgit2
//!
//! Reads the commit history the correlation engine consumes, newest-first,
//! using the git2 crate (Rust bindings to libgit2).

use crate::correlate::CommitRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use git2::{Repository, Sort};
use std::path::Path;
use tracing::debug;

/// Commit log reader for a local repository.
pub struct CommitLog {
    repo: Repository,
}

impl CommitLog {
    /// Open the repository containing `path` (any subdirectory works).
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("Failed to open git repository at {:?}", path))?;
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self { repo })
    }

    /// Check if a path is inside a git repository.
    pub fn is_git_repo(path: &Path) -> bool {
        Repository::discover(path).is_ok()
    }

    /// Read commits newest-first from HEAD, skipping merge commits.
    ///
    /// # Arguments
    /// * `max_commits` - Maximum number of commits to return
    /// * `since` - Optional cutoff; the walk stops at the first older commit
    pub fn recent_commits(
        &self,
        max_commits: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<CommitRecord>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        let mut commits = Vec::new();

        for oid_result in revwalk {
            if commits.len() >= max_commits {
                break;
            }

            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;

            // Merge commits carry no work of their own
            if commit.parent_count() > 1 {
                continue;
            }

            let timestamp = commit_time(&commit);
            if let Some(cutoff) = since {
                if timestamp < cutoff {
                    break; // Commits are sorted by time, so we can stop
                }
            }

            commits.push(to_record(&commit, timestamp));
        }

        debug!("Read {} commits", commits.len());
        Ok(commits)
    }
}

fn commit_time(commit: &git2::Commit) -> DateTime<Utc> {
    Utc.timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn to_record(commit: &git2::Commit, timestamp: DateTime<Utc>) -> CommitRecord {
    let full_hash = commit.id().to_string();
    let short_hash = full_hash[..7].to_string();
    let subject = commit
        .message()
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .to_string();

    CommitRecord {
        full_hash,
        short_hash,
        subject,
        author: commit.author().name().unwrap_or("Unknown").to_string(),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn init_repo(dir: &Path) -> Result<Repository> {
        let repo = Repository::init(dir)?;
        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;
        Ok(repo)
    }

    fn add_commit(repo: &Repository, file: &str, message: &str) -> Result<git2::Oid> {
        let dir = repo.workdir().context("bare repo")?;
        std::fs::write(dir.join(file), message)?;

        let sig = repo.signature()?;
        let tree_id = {
            let mut index = repo.index()?;
            index.add_path(Path::new(file))?;
            index.write()?;
            index.write_tree()?
        };
        let tree = repo.find_tree(tree_id)?;
        let parent = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        Ok(repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?)
    }

    #[test]
    fn test_open_and_discover() -> Result<()> {
        let dir = tempdir()?;
        let repo = init_repo(dir.path())?;
        add_commit(&repo, "a.txt", "fix: initial")?;

        assert!(CommitLog::is_git_repo(dir.path()));
        CommitLog::open(dir.path())?;

        let non_repo = tempdir()?;
        assert!(!CommitLog::is_git_repo(non_repo.path()));
        Ok(())
    }

    #[test]
    fn test_recent_commits_fields() -> Result<()> {
        let dir = tempdir()?;
        let repo = init_repo(dir.path())?;
        add_commit(&repo, "a.txt", "feat(core): first\n\nbody text")?;

        let log = CommitLog::open(dir.path())?;
        let commits = log.recent_commits(10, None)?;
        assert_eq!(commits.len(), 1);

        let commit = &commits[0];
        assert_eq!(commit.subject, "feat(core): first");
        assert_eq!(commit.author, "Test User");
        assert_eq!(commit.short_hash.len(), 7);
        assert!(commit.full_hash.starts_with(&commit.short_hash));
        Ok(())
    }

    #[test]
    fn test_max_commits_cap() -> Result<()> {
        let dir = tempdir()?;
        let repo = init_repo(dir.path())?;
        add_commit(&repo, "a.txt", "fix: one")?;
        add_commit(&repo, "b.txt", "fix: two")?;
        add_commit(&repo, "c.txt", "fix: three")?;

        let log = CommitLog::open(dir.path())?;
        assert_eq!(log.recent_commits(2, None)?.len(), 2);
        assert_eq!(log.recent_commits(10, None)?.len(), 3);
        Ok(())
    }

    #[test]
    fn test_since_cutoff_excludes_older_commits() -> Result<()> {
        let dir = tempdir()?;
        let repo = init_repo(dir.path())?;
        add_commit(&repo, "a.txt", "fix: one")?;
        add_commit(&repo, "b.txt", "fix: two")?;

        let log = CommitLog::open(dir.path())?;

        let future = Utc::now() + chrono::Duration::days(1);
        assert!(log.recent_commits(10, Some(future))?.is_empty());

        let past = Utc::now() - chrono::Duration::days(1);
        assert_eq!(log.recent_commits(10, Some(past))?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_merge_commits_skipped() -> Result<()> {
        let dir = tempdir()?;
        let repo = init_repo(dir.path())?;
        let first = add_commit(&repo, "a.txt", "fix: one")?;
        let second = add_commit(&repo, "b.txt", "fix: two")?;

        // Synthesize a two-parent commit on HEAD
        let sig = repo.signature()?;
        let tree = repo.find_commit(second)?.tree()?;
        let (c1, c2) = (repo.find_commit(first)?, repo.find_commit(second)?);
        repo.commit(Some("HEAD"), &sig, &sig, "Merge branch 'x'", &tree, &[&c2, &c1])?;

        let log = CommitLog::open(dir.path())?;
        let commits = log.recent_commits(10, None)?;
        assert_eq!(commits.len(), 2);
        assert!(commits.iter().all(|c| !c.subject.starts_with("Merge")));
        Ok(())
    }
}
