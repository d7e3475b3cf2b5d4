use crate::types::{ActivityMap, CandidateMap, ResultEntry, Thresholds};

/// Keep candidates meeting both the follower and post-count floors, in map
/// order. A candidate with no activity entry counts as zero posts.
pub fn filter_candidates(
    candidates: &CandidateMap,
    activity: &ActivityMap,
    thresholds: &Thresholds,
) -> Vec<ResultEntry> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let posts = activity.get(&candidate.id).copied().unwrap_or(0);
            (candidate.followers >= thresholds.min_followers && posts >= thresholds.min_posts)
                .then(|| ResultEntry::new(candidate, posts))
        })
        .collect()
}
