// Test doubles for the pipeline's trait seams.
//
// - ScriptedGenerator (TextGenerator): fixed reply or fixed failure
// - MockPlatform (SocialPlatform): keyword → users, author → post count
// - MemorySink (ResultSink): keeps every written ResultSet in memory
//
// Unregistered searches and timelines return `Err`, mirroring a failed call.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use x_client::{
    Includes, SearchRecentParams, SearchResponse, TimelineParams, TimelineResponse, Tweet, User,
    UserPublicMetrics,
};

use crate::collector::build_query;
use crate::sink::ResultSink;
use crate::traits::{SocialPlatform, TextGenerator};
use crate::types::{Candidate, ResultSet};

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// An included-user object with a follower count.
pub fn user(id: &str, username: &str, followers: u64) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        name: None,
        public_metrics: Some(UserPublicMetrics {
            followers_count: Some(followers),
            ..Default::default()
        }),
    }
}

pub fn candidate(id: &str, username: &str, followers: u64) -> Candidate {
    Candidate {
        id: id.to_string(),
        username: username.to_string(),
        followers,
    }
}

fn tweets(author_id: &str, count: usize) -> Vec<Tweet> {
    (0..count)
        .map(|i| Tweet {
            id: format!("{author_id}-{i}"),
            text: format!("post {i}"),
            author_id: Some(author_id.to_string()),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

pub struct ScriptedGenerator {
    reply: std::result::Result<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    pub fn reply(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every (system, user) pair received so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

// ---------------------------------------------------------------------------
// MockPlatform
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockPlatform {
    searches: HashMap<String, Vec<User>>,
    posts: HashMap<String, usize>,
    search_log: Mutex<Vec<SearchRecentParams>>,
    timeline_log: Mutex<Vec<TimelineParams>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the included users returned when `keyword` is searched.
    pub fn on_search(mut self, keyword: &str, users: Vec<User>) -> Self {
        self.searches.insert(build_query(keyword), users);
        self
    }

    /// Make the search for `keyword` fail.
    pub fn on_search_error(mut self, keyword: &str) -> Self {
        self.searches.remove(&build_query(keyword));
        self
    }

    /// Register how many posts `author_id` made in the window.
    pub fn on_posts(mut self, author_id: &str, count: usize) -> Self {
        self.posts.insert(author_id.to_string(), count);
        self
    }

    pub fn searches(&self) -> Vec<SearchRecentParams> {
        self.search_log.lock().unwrap().clone()
    }

    pub fn timelines(&self) -> Vec<TimelineParams> {
        self.timeline_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl SocialPlatform for MockPlatform {
    async fn search_recent(&self, params: &SearchRecentParams) -> Result<SearchResponse> {
        self.search_log.lock().unwrap().push(params.clone());
        let users = self
            .searches
            .get(&params.query)
            .cloned()
            .ok_or_else(|| anyhow!("MockPlatform: no search registered for {}", params.query))?;

        let data = users
            .iter()
            .enumerate()
            .map(|(i, u)| Tweet {
                id: format!("s-{}-{i}", u.id),
                text: params.query.clone(),
                author_id: Some(u.id.clone()),
            })
            .collect();

        Ok(SearchResponse {
            data: Some(data),
            includes: Some(Includes { users }),
            ..Default::default()
        })
    }

    async fn user_posts(&self, params: &TimelineParams) -> Result<TimelineResponse> {
        self.timeline_log.lock().unwrap().push(params.clone());
        let count = self
            .posts
            .get(&params.user_id)
            .copied()
            .ok_or_else(|| anyhow!("MockPlatform: no timeline registered for {}", params.user_id))?;

        Ok(TimelineResponse {
            data: (count > 0).then(|| tweets(&params.user_id, count)),
            ..Default::default()
        })
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

pub struct MemorySink {
    name: String,
    written: Mutex<Vec<ResultSet>>,
}

impl MemorySink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn written(&self) -> Vec<ResultSet> {
        self.written.lock().unwrap().clone()
    }
}

impl ResultSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, results: &ResultSet) -> Result<()> {
        self.written.lock().unwrap().push(results.clone());
        Ok(())
    }
}
