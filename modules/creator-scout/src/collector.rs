//! Candidate collection: one recent search per keyword, authors merged by id.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use x_client::SearchRecentParams;

use crate::traits::SocialPlatform;
use crate::types::{Candidate, CandidateMap};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;
pub const DEFAULT_PER_KEYWORD_LIMIT: u32 = 10;

/// Hard cap the search endpoint accepts per request.
pub const MAX_RESULTS_CAP: u32 = 100;

/// Keyword with reposts excluded and language pinned to English.
pub fn build_query(keyword: &str) -> String {
    format!("{keyword} -is:retweet lang:en")
}

pub struct CandidateCollector {
    platform: Arc<dyn SocialPlatform>,
    lookback_days: i64,
    per_keyword_limit: u32,
}

impl CandidateCollector {
    pub fn new(platform: Arc<dyn SocialPlatform>) -> Self {
        Self {
            platform,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            per_keyword_limit: DEFAULT_PER_KEYWORD_LIMIT,
        }
    }

    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_per_keyword_limit(mut self, limit: u32) -> Self {
        self.per_keyword_limit = limit;
        self
    }

    /// Search each keyword in order and merge the included authors.
    ///
    /// A failed keyword is logged and skipped. When an author appears under
    /// several keywords, the last keyword's metadata wins.
    pub async fn collect(&self, keywords: &[String]) -> CandidateMap {
        let start_time = Utc::now() - Duration::days(self.lookback_days);
        let max_results = self.per_keyword_limit.min(MAX_RESULTS_CAP);
        let mut authors = CandidateMap::new();

        for keyword in keywords {
            let params = SearchRecentParams {
                query: build_query(keyword),
                max_results,
                start_time,
                expansions: vec!["author_id".to_string()],
                user_fields: vec!["username".to_string(), "public_metrics".to_string()],
            };

            let response = match self.platform.search_recent(&params).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(keyword = keyword.as_str(), error = %e, "Keyword search failed, skipping");
                    continue;
                }
            };

            // The endpoint's floor of 10 can return more than asked for.
            let users = response.included_users();
            debug!(keyword = keyword.as_str(), users = users.len(), "Keyword search returned");

            for user in users.iter().take(max_results as usize) {
                authors.upsert(Candidate {
                    id: user.id.clone(),
                    username: user.username.clone(),
                    followers: user.followers_count(),
                });
            }
        }

        info!(keywords = keywords.len(), candidates = authors.len(), "Collected candidates");
        authors
    }
}
