//! Temporal join of commits onto the play timeline

use super::{CommitRecord, PlayEvent, UNKNOWN_TRACK};
use chrono::{DateTime, Utc};

/// Assign each commit the track that was playing at its timestamp.
///
/// A play event covers the half-open window `[played_at, played_at +
/// duration)`. When overlapping windows contain the same instant, the most
/// recently started one wins. Commits outside every window are assigned
/// [`UNKNOWN_TRACK`].
///
/// `plays` must be sorted ascending by `played_at`. The output has the same
/// length and order as `commits`; every commit receives exactly one
/// assignment.
pub fn correlate<'a>(
    commits: &'a [CommitRecord],
    plays: &[PlayEvent],
) -> Vec<(&'a CommitRecord, String)> {
    // Running maximum of window ends. The backward scan below stops as soon
    // as no earlier window can still reach the commit instant, keeping the
    // per-commit cost at O(log m) plus the overlap depth.
    let mut max_end: Vec<DateTime<Utc>> = Vec::with_capacity(plays.len());
    for play in plays {
        let end = play.window_end();
        let max = match max_end.last() {
            Some(&prev) if prev > end => prev,
            _ => end,
        };
        max_end.push(max);
    }

    commits
        .iter()
        .map(|commit| (commit, assign(commit.timestamp, plays, &max_end)))
        .collect()
}

fn assign(tc: DateTime<Utc>, plays: &[PlayEvent], max_end: &[DateTime<Utc>]) -> String {
    // First index whose window starts after the commit; only earlier windows
    // can contain it.
    let cut = plays.partition_point(|p| p.played_at <= tc);
    for i in (0..cut).rev() {
        if max_end[i] <= tc {
            break;
        }
        if plays[i].window_end() > tc {
            return plays[i].track_id.clone();
        }
    }
    UNKNOWN_TRACK.to_string()
}
