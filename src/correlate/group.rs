//! Run-length grouping of track assignments

use super::CommitRecord;

/// A contiguous run of commits sharing one track assignment, before
/// metadata and classification are attached.
#[derive(Debug)]
pub struct GroupSkeleton<'a> {
    pub track_id: String,
    pub commits: Vec<&'a CommitRecord>,
}

/// Collapse consecutive same-track assignments into ordered groups.
///
/// This is run-length collapsing, not group-by-key: two runs of the same
/// track separated by any other assignment stay two distinct groups, each
/// keeping its own contiguous commit subsequence. Input order is preserved
/// within and across groups. An explicit accumulator, so arbitrarily long
/// histories cannot overflow the stack.
pub fn group_runs<'a>(assigned: &[(&'a CommitRecord, String)]) -> Vec<GroupSkeleton<'a>> {
    let mut groups: Vec<GroupSkeleton<'a>> = Vec::new();
    for (commit, track_id) in assigned {
        match groups.last_mut() {
            Some(last) if last.track_id == *track_id => last.commits.push(commit),
            _ => groups.push(GroupSkeleton {
                track_id: track_id.clone(),
                commits: vec![commit],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn commit(hash: &str) -> CommitRecord {
        CommitRecord {
            full_hash: hash.repeat(10),
            short_hash: hash.to_string(),
            subject: format!("feat: {hash}"),
            author: "Test User".to_string(),
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    fn assign<'a>(pairs: &[(&'a CommitRecord, &str)]) -> Vec<(&'a CommitRecord, String)> {
        pairs.iter().map(|(c, t)| (*c, t.to_string())).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(group_runs(&[]).is_empty());
    }

    #[test]
    fn test_single_run_collapses() {
        let (c1, c2) = (commit("c1"), commit("c2"));
        let groups = group_runs(&assign(&[(&c1, "A"), (&c2, "A")]));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].track_id, "A");
        assert_eq!(groups[0].commits.len(), 2);
        assert_eq!(groups[0].commits[0].short_hash, "c1");
        assert_eq!(groups[0].commits[1].short_hash, "c2");
    }

    #[test]
    fn test_non_adjacent_recurrence_stays_separate() {
        let (c1, c2, c3) = (commit("c1"), commit("c2"), commit("c3"));
        let groups = group_runs(&assign(&[(&c1, "A"), (&c2, "B"), (&c3, "A")]));
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].track_id, "A");
        assert_eq!(groups[1].track_id, "B");
        assert_eq!(groups[2].track_id, "A");
    }

    #[test]
    fn test_no_adjacent_groups_share_a_track() {
        let commits: Vec<CommitRecord> = (0..6).map(|i| commit(&format!("c{i}"))).collect();
        let ids = ["A", "A", "unknown", "unknown", "B", "B"];
        let pairs: Vec<_> = commits.iter().zip(ids).map(|(c, t)| (c, t)).collect();
        let groups = group_runs(&assign(&pairs));
        assert_eq!(groups.len(), 3);
        for pair in groups.windows(2) {
            assert_ne!(pair[0].track_id, pair[1].track_id);
        }
    }
}
