use std::sync::Arc;

use anyhow::Result;

use crate::config::ExecutionMode;
use crate::crew::run_crew;
use crate::pipeline::PipelineRunner;
use crate::sink::ResultSink;
use crate::types::ResultEntry;

/// Sinks for both execution paths. The crew path may also write the direct
/// sink when it falls back.
pub struct Sinks {
    pub direct: Box<dyn ResultSink>,
    pub crew: Box<dyn ResultSink>,
}

/// Run discovery for `topic` using the selected strategy.
pub async fn execute(
    mode: ExecutionMode,
    runner: Arc<PipelineRunner>,
    llm: &str,
    topic: &str,
    sinks: &Sinks,
) -> Result<Vec<ResultEntry>> {
    match mode {
        ExecutionMode::Direct => runner.run(topic, sinks.direct.as_ref()).await,
        ExecutionMode::Crew => {
            run_crew(runner, llm, topic, sinks.direct.as_ref(), sinks.crew.as_ref()).await
        }
    }
}
