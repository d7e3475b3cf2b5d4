use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

// --- Request parameters ---

/// Parameters for `GET /2/tweets/search/recent`.
#[derive(Debug, Clone)]
pub struct SearchRecentParams {
    pub query: String,
    pub max_results: u32,
    pub start_time: DateTime<Utc>,
    pub expansions: Vec<String>,
    pub user_fields: Vec<String>,
}

impl SearchRecentParams {
    /// The endpoint rejects `max_results` outside 10..=100.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("query", self.query.clone()),
            ("max_results", self.max_results.clamp(10, 100).to_string()),
            ("start_time", format_timestamp(&self.start_time)),
        ];
        if !self.expansions.is_empty() {
            query.push(("expansions", self.expansions.join(",")));
        }
        if !self.user_fields.is_empty() {
            query.push(("user.fields", self.user_fields.join(",")));
        }
        query
    }
}

/// Parameters for `GET /2/users/:id/tweets`.
#[derive(Debug, Clone)]
pub struct TimelineParams {
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub max_results: u32,
}

impl TimelineParams {
    /// The endpoint rejects `max_results` outside 5..=100.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("start_time", format_timestamp(&self.start_time)),
            ("max_results", self.max_results.clamp(5, 100).to_string()),
        ]
    }
}

/// X wants RFC 3339 with a `Z` suffix and no sub-second digits.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// --- Response payloads ---

/// A single post as returned in `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub author_id: Option<String>,
}

/// Public counters on a user object. Only present when requested via `user.fields`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPublicMetrics {
    pub followers_count: Option<u64>,
    pub following_count: Option<u64>,
    pub tweet_count: Option<u64>,
    pub listed_count: Option<u64>,
}

/// A user object from the `includes.users` expansion.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub public_metrics: Option<UserPublicMetrics>,
}

impl User {
    pub fn followers_count(&self) -> u64 {
        self.public_metrics
            .as_ref()
            .and_then(|m| m.followers_count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    pub result_count: Option<u32>,
    pub newest_id: Option<String>,
    pub oldest_id: Option<String>,
    pub next_token: Option<String>,
}

/// Partial-failure entries X attaches to otherwise successful responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiProblem {
    pub title: Option<String>,
    pub detail: Option<String>,
}

/// Body of a recent-search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    pub data: Option<Vec<Tweet>>,
    pub includes: Option<Includes>,
    pub meta: Option<Meta>,
    #[serde(default)]
    pub errors: Vec<ApiProblem>,
}

impl SearchResponse {
    /// Users from the author expansion, empty when the expansion is missing.
    pub fn included_users(&self) -> &[User] {
        self.includes
            .as_ref()
            .map(|i| i.users.as_slice())
            .unwrap_or(&[])
    }
}

/// Body of a user-timeline response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineResponse {
    pub data: Option<Vec<Tweet>>,
    pub meta: Option<Meta>,
    #[serde(default)]
    pub errors: Vec<ApiProblem>,
}

impl TimelineResponse {
    pub fn post_count(&self) -> usize {
        self.data.as_ref().map(Vec::len).unwrap_or(0)
    }
}
