use anyhow::{Context, Result};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Which control structure runs the pipeline. Resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Call the pipeline stages directly and write `results.json`.
    Direct,
    /// Wrap the stages in a one-task crew and write `results_crewai.json`.
    Crew,
}

/// Application configuration loaded from environment variables (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Credentials
    pub openai_api_key: String,
    pub twitter_bearer_token: String,

    // Model
    pub openai_model: String,

    // Execution
    pub crew_enabled: bool,

    // Endpoint overrides (proxies, local test servers)
    pub openai_base_url: Option<String>,
    pub x_api_base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY environment variable not set")?,
            twitter_bearer_token: std::env::var("TWITTER_BEARER_TOKEN")
                .context("TWITTER_BEARER_TOKEN environment variable not set")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            crew_enabled: std::env::var("CREW_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            x_api_base_url: std::env::var("X_API_BASE_URL").ok(),
        };

        config.log_keys();
        Ok(config)
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        if self.crew_enabled {
            ExecutionMode::Crew
        } else {
            ExecutionMode::Direct
        }
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.char_indices().nth(5).map(|(i, _)| i).unwrap_or(val.len());
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => v.clone(),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  OPENAI_API_KEY: {}", preview(&self.openai_api_key));
        tracing::info!("  TWITTER_BEARER_TOKEN: {}", preview(&self.twitter_bearer_token));
        tracing::info!("  OPENAI_MODEL: {}", self.openai_model);
        tracing::info!("  CREW_ENABLED: {}", self.crew_enabled);
        tracing::info!("  OPENAI_BASE_URL: {}", preview_opt(&self.openai_base_url));
        tracing::info!("  X_API_BASE_URL: {}", preview_opt(&self.x_api_base_url));
    }
}

/// Anything but an explicit "off" value counts as enabled.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}
