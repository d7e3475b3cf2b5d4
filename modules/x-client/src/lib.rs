pub mod error;
pub mod types;

pub use error::{Result, XError};
pub use types::{
    format_timestamp, Includes, Meta, SearchRecentParams, SearchResponse, TimelineParams,
    TimelineResponse, Tweet, User, UserPublicMetrics,
};

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://api.x.com";

/// Header carrying the epoch second at which the current rate-limit window resets.
const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";

/// Fallback wait when a 429 arrives without a reset header (one full window).
const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(15 * 60);

pub struct XClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
    wait_on_rate_limit: bool,
}

impl XClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
            wait_on_rate_limit: true,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// When enabled (the default), a 429 blocks the caller until the window
    /// resets and the request is re-sent. When disabled it surfaces as
    /// [`XError::RateLimited`].
    pub fn wait_on_rate_limit(mut self, wait: bool) -> Self {
        self.wait_on_rate_limit = wait;
        self
    }

    /// Search posts from the last seven days.
    pub async fn search_recent_tweets(&self, params: &SearchRecentParams) -> Result<SearchResponse> {
        let url = format!("{}/2/tweets/search/recent", self.base_url);
        tracing::debug!(query = %params.query, max_results = params.max_results, "X recent search");
        self.get_json(&url, &params.to_query()).await
    }

    /// Posts authored by a single user, newest first.
    pub async fn get_users_tweets(&self, params: &TimelineParams) -> Result<TimelineResponse> {
        let url = format!("{}/2/users/{}/tweets", self.base_url, params.user_id);
        tracing::debug!(user_id = %params.user_id, "X user timeline");
        self.get_json(&url, &params.to_query()).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        loop {
            let resp = self
                .client
                .get(url)
                .bearer_auth(&self.token)
                .query(query)
                .send()
                .await?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let reset_at = rate_limit_reset(resp.headers());
                if !self.wait_on_rate_limit {
                    return Err(XError::RateLimited { reset_at });
                }

                let wait = rate_limit_wait(reset_at, Utc::now());
                tracing::warn!(
                    url,
                    wait_secs = wait.as_secs(),
                    "Rate limit exceeded, sleeping until window resets"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(XError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let body = resp.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }
    }
}

fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let epoch: i64 = headers
        .get(RATE_LIMIT_RESET_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    Utc.timestamp_opt(epoch, 0).single()
}

/// Minimum pause between a 429 and the retry, so a stale reset header cannot
/// spin the client in a tight loop.
const MIN_RATE_LIMIT_WAIT: Duration = Duration::from_secs(1);

/// Time to sleep before retrying. A future reset gets one extra second so the
/// new window has actually opened; a reset already in the past still waits
/// [`MIN_RATE_LIMIT_WAIT`].
fn rate_limit_wait(reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    match reset_at {
        Some(reset) if reset > now => {
            (reset - now).to_std().unwrap_or(Duration::ZERO) + Duration::from_secs(1)
        }
        Some(_) => MIN_RATE_LIMIT_WAIT,
        None => DEFAULT_RATE_LIMIT_WAIT,
    }
}
