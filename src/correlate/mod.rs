//! Commit-listening correlation engine
//!
//! A pure, synchronous pipeline that merges two independently-sourced,
//! time-ordered event streams: the repository's commit history and a
//! listener's play history. The stages compose left to right:
//!
//! 1. [`correlate`] assigns each commit the track playing at its timestamp
//!    (temporal join by window containment).
//! 2. [`group_runs`] collapses consecutive same-track commits into ordered
//!    groups (run-length grouping, not group-by-key).
//! 3. [`Assembler`] resolves track metadata, classifies each commit subject,
//!    and picks a dominant type per group.
//!
//! Nothing here performs I/O or retains state across invocations; given
//! identical inputs the output is identical on every run.

mod assemble;
mod classify;
mod group;
mod timeline;

pub use assemble::{Assembler, DominantTypePolicy};
pub use classify::{classify, CommitType};
pub use group::{group_runs, GroupSkeleton};
pub use timeline::correlate;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Sentinel track id assigned to commits made while nothing was playing.
pub const UNKNOWN_TRACK: &str = "unknown";

/// A single version-control change, as supplied by the VCS log reader.
#[derive(Debug, Clone, Serialize)]
pub struct CommitRecord {
    /// Full commit hash
    pub full_hash: String,
    /// Abbreviated hash (7 characters)
    pub short_hash: String,
    /// First line of the commit message
    pub subject: String,
    /// Author name
    pub author: String,
    /// Author timestamp
    pub timestamp: DateTime<Utc>,
}

/// A recorded interval during which a specific track was playing.
///
/// Sequences handed to [`correlate`] must be sorted ascending by
/// `played_at`. The Spotify client upholds this; the engine does not
/// re-check it, and assignment is unspecified for unsorted input.
#[derive(Debug, Clone)]
pub struct PlayEvent {
    pub track_id: String,
    pub played_at: DateTime<Utc>,
    pub duration: Duration,
}

impl PlayEvent {
    /// End of the half-open playback window `[played_at, played_at + duration)`.
    pub fn window_end(&self) -> DateTime<Utc> {
        self.played_at + self.duration
    }
}

/// Resolved display metadata for a track. Image fields may be empty.
#[derive(Debug, Clone, Serialize)]
pub struct TrackMetadata {
    pub track_id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub image_small: String,
    pub image_medium: String,
    pub image_large: String,
}

impl TrackMetadata {
    /// Placeholder substituted when metadata resolution fails or is
    /// unavailable. Resolution never fails the overall report.
    pub fn placeholder(track_id: &str) -> Self {
        Self {
            track_id: track_id.to_string(),
            name: "Unknown Track".to_string(),
            artist: "Unknown Artist".to_string(),
            album: String::new(),
            image_small: String::new(),
            image_medium: String::new(),
            image_large: String::new(),
        }
    }
}

/// A commit together with its conventional-commit classification.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedCommit {
    #[serde(flatten)]
    pub commit: CommitRecord,
    pub commit_type: Option<CommitType>,
}

/// A contiguous run of commits written while the same track was playing.
///
/// `commits` is never empty and preserves the original commit order.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelatedGroup {
    pub track_id: String,
    pub metadata: TrackMetadata,
    pub dominant_type: CommitType,
    pub commits: Vec<ClassifiedCommit>,
}

/// The finished, ordered report handed to a rendering collaborator.
///
/// All free-text fields are raw; escaping is the renderer's job.
#[derive(Debug, Clone, Serialize)]
pub struct VibesReport {
    pub total_commits: usize,
    pub total_tracks: usize,
    pub groups: Vec<CorrelatedGroup>,
}

/// Run the full pipeline: correlate, group, assemble.
///
/// `resolve` is consulted at most once per distinct track id; returning
/// `None` degrades to [`TrackMetadata::placeholder`], never to a failure.
pub fn build_report<F>(
    commits: &[CommitRecord],
    plays: &[PlayEvent],
    policy: DominantTypePolicy,
    resolve: F,
) -> VibesReport
where
    F: FnMut(&str) -> Option<TrackMetadata>,
{
    let assigned = correlate(commits, plays);
    let skeletons = group_runs(&assigned);
    let groups = Assembler::new(policy).assemble(&skeletons, resolve);
    VibesReport {
        total_commits: commits.len(),
        total_tracks: groups.len(),
        groups,
    }
}
