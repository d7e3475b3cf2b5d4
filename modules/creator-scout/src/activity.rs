use std::sync::Arc;

use chrono::{Duration, Utc};

use x_client::TimelineParams;

use crate::collector::{DEFAULT_LOOKBACK_DAYS, MAX_RESULTS_CAP};
use crate::traits::SocialPlatform;
use crate::types::{ActivityMap, CandidateMap};

/// Counts each candidate's posts inside the lookback window.
///
/// Only the first page (at most 100 posts) is read, so heavier posters are
/// undercounted. Any failure counts as zero posts.
pub struct ActivityMeasurer {
    platform: Arc<dyn SocialPlatform>,
    lookback_days: i64,
}

impl ActivityMeasurer {
    pub fn new(platform: Arc<dyn SocialPlatform>) -> Self {
        Self {
            platform,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    pub async fn measure(&self, author_id: &str) -> u32 {
        let params = TimelineParams {
            user_id: author_id.to_string(),
            start_time: Utc::now() - Duration::days(self.lookback_days),
            max_results: MAX_RESULTS_CAP,
        };

        match self.platform.user_posts(&params).await {
            Ok(timeline) => u32::try_from(timeline.post_count()).unwrap_or(u32::MAX),
            Err(_) => 0,
        }
    }

    /// Measure every candidate, one request at a time, in map order.
    pub async fn measure_all(&self, candidates: &CandidateMap) -> ActivityMap {
        let mut activity = ActivityMap::with_capacity(candidates.len());
        for candidate in candidates.iter() {
            let posts = self.measure(&candidate.id).await;
            activity.insert(candidate.id.clone(), posts);
        }
        activity
    }
}
