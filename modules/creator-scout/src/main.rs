use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use creator_scout::execution::{execute, Sinks};
use creator_scout::sink::{JsonFileSink, CREW_RESULTS_FILE, DIRECT_RESULTS_FILE};
use creator_scout::{AppConfig, PipelineRunner, DEFAULT_TOPIC};
use x_client::XClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("creator_scout=info".parse()?),
        )
        .init();

    info!("Creator scout starting...");

    // Load config. Nothing can run without credentials, but a missing key is
    // reported rather than treated as a crash.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration incomplete, skipping run");
            return Ok(());
        }
    };

    // Build clients once for the whole run
    let mut openai = OpenAi::new(&config.openai_api_key, &config.openai_model);
    if let Some(url) = &config.openai_base_url {
        openai = openai.with_base_url(url);
    }
    let mut x = XClient::new(config.twitter_bearer_token.clone());
    if let Some(url) = &config.x_api_base_url {
        x = x.with_base_url(url);
    }

    let runner = Arc::new(PipelineRunner::new(Arc::new(openai), Arc::new(x)));
    let sinks = Sinks {
        direct: Box::new(JsonFileSink::new(DIRECT_RESULTS_FILE)),
        crew: Box::new(JsonFileSink::new(CREW_RESULTS_FILE)),
    };

    let mode = config.execution_mode();
    info!(?mode, topic = DEFAULT_TOPIC, "Running creator discovery");

    match execute(mode, runner, &config.openai_model, DEFAULT_TOPIC, &sinks).await {
        Ok(results) => info!(qualifying = results.len(), "Creator discovery complete"),
        Err(e) => error!(error = %e, "Creator discovery failed"),
    }

    Ok(())
}
