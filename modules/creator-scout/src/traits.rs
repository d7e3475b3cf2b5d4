// Trait seams for the pipeline's external capabilities.
//
// TextGenerator wraps the LLM used for keyword generation.
// SocialPlatform wraps recent search and user timelines.
//
// Production wiring passes OpenAi and XClient; tests pass the mocks in
// `testing` so no network is touched.

use anyhow::Result;
use async_trait::async_trait;

use x_client::{SearchRecentParams, SearchResponse, TimelineParams, TimelineResponse};

// ---------------------------------------------------------------------------
// TextGenerator
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One system + user exchange; returns the model's raw text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[async_trait]
impl TextGenerator for ai_client::OpenAi {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.chat_completion(system, user).await
    }
}

// ---------------------------------------------------------------------------
// SocialPlatform
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Recent-post search with author expansion.
    async fn search_recent(&self, params: &SearchRecentParams) -> Result<SearchResponse>;

    /// Posts authored by one user inside a time window.
    async fn user_posts(&self, params: &TimelineParams) -> Result<TimelineResponse>;
}

#[async_trait]
impl SocialPlatform for x_client::XClient {
    async fn search_recent(&self, params: &SearchRecentParams) -> Result<SearchResponse> {
        Ok(self.search_recent_tweets(params).await?)
    }

    async fn user_posts(&self, params: &TimelineParams) -> Result<TimelineResponse> {
        Ok(self.get_users_tweets(params).await?)
    }
}
