use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Minimum follower count for a candidate to qualify.
pub const MIN_FOLLOWERS: u64 = 5000;

/// Minimum post count inside the lookback window for a candidate to qualify.
pub const MIN_TWEETS_2W: u32 = 6;

/// Divisor turning the window's post count into a weekly rate. The window is
/// seven days but the rate has always been reported as a two-week average.
pub const LOOKBACK_WEEKS_DIVISOR: f64 = 2.0;

const PROFILE_URL_BASE: &str = "https://x.com";

/// An author surfaced by keyword search, not yet checked against thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub username: String,
    pub followers: u64,
}

/// Candidates keyed by author id, iterated in first-seen order.
///
/// Re-inserting an existing id replaces its handle and follower count but
/// keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct CandidateMap {
    entries: Vec<Candidate>,
    index: HashMap<String, usize>,
}

impl CandidateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, candidate: Candidate) {
        match self.index.get(&candidate.id) {
            Some(&pos) => self.entries[pos] = candidate,
            None => {
                self.index.insert(candidate.id.clone(), self.entries.len());
                self.entries.push(candidate);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Candidate> for CandidateMap {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        let mut map = CandidateMap::new();
        for candidate in iter {
            map.upsert(candidate);
        }
        map
    }
}

/// Author id → posts inside the lookback window.
pub type ActivityMap = HashMap<String, u32>;

/// Hard cut-offs applied by the filter stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_followers: u64,
    pub min_posts: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_followers: MIN_FOLLOWERS,
            min_posts: MIN_TWEETS_2W,
        }
    }
}

/// A qualifying creator as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub profile_url: String,
    pub username: String,
    pub followers: u64,
    pub tweets_last_2_weeks: u32,
    pub avg_posts_per_week: f64,
}

impl ResultEntry {
    pub fn new(candidate: &Candidate, posts: u32) -> Self {
        Self {
            profile_url: profile_url(&candidate.username),
            username: candidate.username.clone(),
            followers: candidate.followers,
            tweets_last_2_weeks: posts,
            avg_posts_per_week: weekly_rate(posts),
        }
    }
}

/// One run's output document: `{"topic": ..., "results": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub topic: String,
    pub results: Vec<ResultEntry>,
}

pub fn profile_url(username: &str) -> String {
    format!("{PROFILE_URL_BASE}/{username}")
}

/// Posts per week, rounded half away from zero to two decimals.
pub fn weekly_rate(posts: u32) -> f64 {
    (f64::from(posts) / LOOKBACK_WEEKS_DIVISOR * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, username: &str, followers: u64) -> Candidate {
        Candidate {
            id: id.to_string(),
            username: username.to_string(),
            followers,
        }
    }

    #[test]
    fn upsert_overwrites_in_place() {
        let mut map = CandidateMap::new();
        map.upsert(candidate("1", "a", 10));
        map.upsert(candidate("2", "b", 20));
        map.upsert(candidate("1", "a_renamed", 30));

        assert_eq!(map.len(), 2);
        let order: Vec<&str> = map.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["1", "2"]);
        assert_eq!(map.get("1").unwrap().username, "a_renamed");
        assert_eq!(map.get("1").unwrap().followers, 30);
    }

    #[test]
    fn weekly_rate_halves_and_rounds() {
        assert_eq!(weekly_rate(7), 3.5);
        assert_eq!(weekly_rate(10), 5.0);
        assert_eq!(weekly_rate(0), 0.0);
        assert_eq!(weekly_rate(1), 0.5);
    }

    #[test]
    fn entry_serializes_with_persisted_field_names() {
        let entry = ResultEntry::new(&candidate("1", "A", 8000), 10);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["profile_url"], "https://x.com/A");
        assert_eq!(json["username"], "A");
        assert_eq!(json["followers"], 8000);
        assert_eq!(json["tweets_last_2_weeks"], 10);
        assert_eq!(json["avg_posts_per_week"], 5.0);
    }
}
