//! Group enrichment: metadata resolution and commit type tagging

use super::{
    classify, ClassifiedCommit, CommitType, CorrelatedGroup, GroupSkeleton, TrackMetadata,
    UNKNOWN_TRACK,
};
use std::collections::HashMap;

/// What to display for a group in which no commit carries a known type.
///
/// The historical behavior falls back to `feat` rather than introducing a
/// distinct "untyped" category; set `fallback` to change that.
#[derive(Debug, Clone, Copy)]
pub struct DominantTypePolicy {
    pub fallback: CommitType,
}

impl Default for DominantTypePolicy {
    fn default() -> Self {
        Self {
            fallback: CommitType::Feat,
        }
    }
}

/// Turns group skeletons into finished [`CorrelatedGroup`]s.
///
/// Metadata lookups are memoized for the lifetime of one assembler, so a
/// track recurring in separate runs costs one resolver call. The assembler
/// is consumed per report run; nothing is shared across runs.
pub struct Assembler {
    policy: DominantTypePolicy,
    memo: HashMap<String, TrackMetadata>,
}

impl Assembler {
    pub fn new(policy: DominantTypePolicy) -> Self {
        Self {
            policy,
            memo: HashMap::new(),
        }
    }

    /// Enrich each skeleton in order. `resolve` may be backed by a network
    /// client; a `None` degrades to [`TrackMetadata::placeholder`].
    pub fn assemble<F>(
        mut self,
        skeletons: &[GroupSkeleton<'_>],
        mut resolve: F,
    ) -> Vec<CorrelatedGroup>
    where
        F: FnMut(&str) -> Option<TrackMetadata>,
    {
        skeletons
            .iter()
            .map(|skeleton| {
                let metadata = self.resolve_memoized(&skeleton.track_id, &mut resolve);
                let commits: Vec<ClassifiedCommit> = skeleton
                    .commits
                    .iter()
                    .map(|commit| ClassifiedCommit {
                        commit: (*commit).clone(),
                        commit_type: classify(&commit.subject),
                    })
                    .collect();
                // First typed commit in stored order wins; otherwise the
                // policy fallback.
                let dominant_type = commits
                    .iter()
                    .find_map(|c| c.commit_type)
                    .unwrap_or(self.policy.fallback);
                CorrelatedGroup {
                    track_id: skeleton.track_id.clone(),
                    metadata,
                    dominant_type,
                    commits,
                }
            })
            .collect()
    }

    fn resolve_memoized<F>(&mut self, track_id: &str, resolve: &mut F) -> TrackMetadata
    where
        F: FnMut(&str) -> Option<TrackMetadata>,
    {
        if track_id == UNKNOWN_TRACK {
            // The sentinel has no metadata to look up
            return TrackMetadata::placeholder(track_id);
        }
        if let Some(found) = self.memo.get(track_id) {
            return found.clone();
        }
        let metadata =
            resolve(track_id).unwrap_or_else(|| TrackMetadata::placeholder(track_id));
        self.memo.insert(track_id.to_string(), metadata.clone());
        metadata
    }
}
