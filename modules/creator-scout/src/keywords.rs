//! LLM-backed keyword generation for a topic.
//!
//! The model is asked for a JSON array. Anything that does not parse as one
//! falls back to a fixed list. That list is about US markets no matter what
//! topic was requested.

use std::sync::Arc;

use tracing::{info, warn};

use crate::traits::TextGenerator;

pub const DEFAULT_KEYWORD_COUNT: usize = 3;

pub const FALLBACK_KEYWORDS: [&str; 3] = ["US stock market", "Wall Street", "S&P 500"];

const SYSTEM_PROMPT: &str = "Return a JSON array of keywords.";

pub struct KeywordGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl KeywordGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Ask the model for `n` keywords. Never fails: a generation error or an
    /// unparseable reply yields [`FALLBACK_KEYWORDS`].
    pub async fn generate(&self, topic: &str, n: usize) -> Vec<String> {
        let prompt = format!("Give {n} short keywords for: {topic}");

        let raw = match self.generator.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(topic, error = %e, "Keyword generation failed, using fallback keywords");
                return fallback_keywords();
            }
        };

        match parse_keywords(&raw) {
            Some(keywords) => {
                info!(topic, count = keywords.len(), "Generated keywords");
                keywords
            }
            None => {
                warn!(topic, response = raw.as_str(), "Unparseable keyword response, using fallback keywords");
                fallback_keywords()
            }
        }
    }
}

/// Parse a JSON array as-is. Length is not checked against the requested
/// count. Non-string elements keep their JSON text.
pub fn parse_keywords(raw: &str) -> Option<Vec<String>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;
    Some(
        values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
    )
}

pub fn fallback_keywords() -> Vec<String> {
    FALLBACK_KEYWORDS.iter().map(|k| k.to_string()).collect()
}
