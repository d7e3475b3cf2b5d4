//! Agent/task orchestration around the discovery pipeline.
//!
//! A [`Crew`] runs its [`Task`]s one after another and reports the final
//! task's output as a [`CrewOutput`]. The creator search uses a single task
//! whose body is the same four pipeline stages as the direct path, so the
//! filtering is identical. Only the control structure and sink differ.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::pipeline::PipelineRunner;
use crate::sink::ResultSink;
use crate::types::{ResultEntry, ResultSet};

// =============================================================================
// Agent
// =============================================================================

#[derive(Debug, Clone)]
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub llm: String,
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        llm: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            llm: llm.into(),
        }
    }

    /// The agent that owns the search-and-filter task.
    pub fn keyword_generator(llm: impl Into<String>) -> Self {
        Self::new(
            "Keyword Generator",
            "Generate keywords for searching creators about financial markets",
            "Expert at picking concise keywords.",
            llm,
        )
    }
}

// =============================================================================
// Task
// =============================================================================

/// What a task body sees when it runs.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub description: String,
    pub agent_role: String,
    /// Output of the preceding task, if any.
    pub previous: Option<CrewOutput>,
}

pub type TaskFn = Box<dyn FnOnce(TaskContext) -> BoxFuture<'static, Result<CrewOutput>> + Send>;

pub struct Task {
    pub description: String,
    pub expected_output: String,
    pub agent: Agent,
    func: TaskFn,
}

impl Task {
    pub fn new<F>(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Agent,
        func: F,
    ) -> Self
    where
        F: FnOnce(TaskContext) -> BoxFuture<'static, Result<CrewOutput>> + Send + 'static,
    {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            func: Box::new(func),
        }
    }
}

// =============================================================================
// CrewOutput
// =============================================================================

/// The shapes a task can report its result in.
#[derive(Debug, Clone, PartialEq)]
pub enum CrewOutput {
    /// Raw text, usually serialized JSON.
    Raw(String),
    /// A key/value document.
    Structured(Map<String, Value>),
    /// A JSON projection of the result.
    Json(Value),
    /// Anything else, passed through untouched.
    Opaque(Value),
}

impl CrewOutput {
    /// Collapse to a JSON value. Raw text is parsed when it is JSON and kept
    /// as a string otherwise.
    pub fn into_value(self) -> Value {
        match self {
            CrewOutput::Raw(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            CrewOutput::Structured(map) => Value::Object(map),
            CrewOutput::Json(value) => value,
            CrewOutput::Opaque(value) => value,
        }
    }

    /// Decode into result entries. Accepts a bare list or a document with a
    /// `results` list.
    pub fn into_entries(self) -> Result<Vec<ResultEntry>> {
        let value = match self.into_value() {
            Value::Object(mut map) => map
                .remove("results")
                .ok_or_else(|| anyhow!("crew output has no `results` field"))?,
            other => other,
        };
        serde_json::from_value(value).context("crew output is not a list of result entries")
    }
}

// =============================================================================
// Crew
// =============================================================================

pub struct Crew {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
}

impl Crew {
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>) -> Self {
        Self { agents, tasks }
    }

    /// Run every task in order, feeding each the previous output, and return
    /// the last one. The first failing task aborts the crew.
    pub async fn kickoff(self) -> Result<CrewOutput> {
        if self.tasks.is_empty() {
            bail!("crew has no tasks");
        }

        let total = self.tasks.len();
        info!(agents = self.agents.len(), tasks = total, "Crew kickoff");

        let mut previous: Option<CrewOutput> = None;
        for (i, task) in self.tasks.into_iter().enumerate() {
            info!(
                task = i + 1,
                total,
                agent = task.agent.role.as_str(),
                description = task.description.as_str(),
                "Task started"
            );

            let ctx = TaskContext {
                description: task.description.clone(),
                agent_role: task.agent.role.clone(),
                previous: previous.take(),
            };

            match (task.func)(ctx).await {
                Ok(output) => {
                    info!(task = i + 1, expected = task.expected_output.as_str(), "Task complete");
                    previous = Some(output);
                }
                Err(e) => {
                    warn!(task = i + 1, error = %e, "Task failed");
                    return Err(e.context(format!("task '{}' failed", task.description)));
                }
            }
        }

        previous.ok_or_else(|| anyhow!("crew produced no output"))
    }
}

// =============================================================================
// Creator search via crew
// =============================================================================

/// The one-task crew whose body is the direct pipeline's discovery stages.
pub fn search_crew(runner: Arc<PipelineRunner>, llm: &str, topic: &str) -> Crew {
    let agent = Agent::keyword_generator(llm);

    let task_topic = topic.to_string();
    let task = Task::new(
        format!("Run search & filter pipeline for {topic}"),
        "Final JSON list of users",
        agent.clone(),
        move |_ctx| {
            async move {
                let results = runner.discover(&task_topic).await;
                Ok::<_, anyhow::Error>(CrewOutput::Raw(serde_json::to_string(&results)?))
            }
            .boxed()
        },
    );

    Crew::new(vec![agent], vec![task])
}

/// Run discovery inside [`search_crew`] and write to `crew_sink`.
pub async fn run_crew(
    runner: Arc<PipelineRunner>,
    llm: &str,
    topic: &str,
    direct_sink: &dyn ResultSink,
    crew_sink: &dyn ResultSink,
) -> Result<Vec<ResultEntry>> {
    let crew = search_crew(runner.clone(), llm, topic);
    kickoff_with_fallback(crew, &runner, topic, direct_sink, crew_sink).await
}

/// Kick off `crew` and write its entries to `crew_sink`.
///
/// If the crew fails or its output does not decode, the direct pipeline
/// runs instead (writing to `direct_sink` as it always does) and its results
/// are then written to `crew_sink` as well.
pub async fn kickoff_with_fallback(
    crew: Crew,
    runner: &PipelineRunner,
    topic: &str,
    direct_sink: &dyn ResultSink,
    crew_sink: &dyn ResultSink,
) -> Result<Vec<ResultEntry>> {
    let results = match crew.kickoff().await.and_then(CrewOutput::into_entries) {
        Ok(results) => results,
        Err(e) => {
            warn!(error = %e, "CrewAI flow failed, falling back to direct pipeline");
            runner.run(topic, direct_sink).await?
        }
    };

    let set = ResultSet {
        topic: topic.to_string(),
        results,
    };
    crew_sink.write(&set)?;
    info!(
        "CrewAI flow finished, saved {} users to {}",
        set.results.len(),
        crew_sink.name()
    );
    Ok(set.results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{user, MemorySink, MockPlatform, ScriptedGenerator};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn entry_json() -> Value {
        json!({
            "profile_url": "https://x.com/A",
            "username": "A",
            "followers": 8000,
            "tweets_last_2_weeks": 10,
            "avg_posts_per_week": 5.0
        })
    }

    #[test]
    fn raw_json_text_decodes() {
        let raw = CrewOutput::Raw(json!([entry_json()]).to_string());
        let entries = raw.into_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].username, "A");
    }

    #[test]
    fn raw_plain_text_stays_a_string() {
        let raw = CrewOutput::Raw("all done!".to_string());
        assert_eq!(raw.clone().into_value(), json!("all done!"));
        assert!(raw.into_entries().is_err());
    }

    #[test]
    fn structured_document_uses_results_field() {
        let mut map = Map::new();
        map.insert("topic".to_string(), json!("t"));
        map.insert("results".to_string(), json!([entry_json()]));

        let entries = CrewOutput::Structured(map).into_entries().unwrap();
        assert_eq!(entries[0].followers, 8000);
    }

    #[test]
    fn structured_document_without_results_fails() {
        let mut map = Map::new();
        map.insert("raw".to_string(), json!("text"));
        assert!(CrewOutput::Structured(map).into_entries().is_err());
    }

    #[test]
    fn json_and_opaque_pass_through() {
        assert_eq!(CrewOutput::Json(json!([])).into_entries().unwrap(), vec![]);
        assert_eq!(CrewOutput::Opaque(json!(42)).into_value(), json!(42));
        assert!(CrewOutput::Opaque(json!(42)).into_entries().is_err());
    }

    #[tokio::test]
    async fn kickoff_without_tasks_fails() {
        let crew = Crew::new(vec![Agent::keyword_generator("gpt-4o-mini")], vec![]);
        assert!(crew.kickoff().await.is_err());
    }

    #[tokio::test]
    async fn kickoff_chains_outputs_and_returns_last() {
        let agent = Agent::keyword_generator("gpt-4o-mini");
        let first = Task::new("first", "a number", agent.clone(), |_ctx| {
            async { Ok::<_, anyhow::Error>(CrewOutput::Json(json!(1))) }.boxed()
        });
        let second = Task::new("second", "echo", agent.clone(), |ctx| {
            async move {
                let prev = ctx.previous.map(CrewOutput::into_value);
                Ok::<_, anyhow::Error>(CrewOutput::Json(
                    json!({ "saw": prev, "role": ctx.agent_role }),
                ))
            }
            .boxed()
        });

        let output = Crew::new(vec![agent], vec![first, second]).kickoff().await.unwrap();

        assert_eq!(
            output,
            CrewOutput::Json(json!({ "saw": 1, "role": "Keyword Generator" }))
        );
    }

    #[tokio::test]
    async fn failing_task_aborts_crew() {
        let agent = Agent::keyword_generator("gpt-4o-mini");
        let boom = Task::new("boom", "nothing", agent.clone(), |_ctx| {
            async { Err::<CrewOutput, _>(anyhow!("llm unavailable")) }.boxed()
        });
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let never = Task::new("never", "nothing", agent.clone(), move |_ctx| {
            async move {
                flag.store(true, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(CrewOutput::Json(Value::Null))
            }
            .boxed()
        });

        let err = Crew::new(vec![agent], vec![boom, never])
            .kickoff()
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("llm unavailable"));
        assert!(!ran.load(Ordering::SeqCst));
    }

    fn markets_runner() -> Arc<PipelineRunner> {
        let platform = MockPlatform::new()
            .on_search("stocks", vec![user("1", "A", 8000)])
            .on_posts("1", 10);
        Arc::new(PipelineRunner::new(
            Arc::new(ScriptedGenerator::reply(r#"["stocks"]"#)),
            Arc::new(platform),
        ))
    }

    #[test]
    fn search_crew_describes_the_task() {
        let crew = search_crew(markets_runner(), "gpt-4o-mini", "US financial markets");
        assert_eq!(crew.agents.len(), 1);
        assert_eq!(crew.agents[0].role, "Keyword Generator");
        assert_eq!(crew.agents[0].llm, "gpt-4o-mini");
        assert_eq!(crew.tasks.len(), 1);
        assert_eq!(
            crew.tasks[0].description,
            "Run search & filter pipeline for US financial markets"
        );
        assert_eq!(crew.tasks[0].expected_output, "Final JSON list of users");
    }

    #[tokio::test]
    async fn failed_crew_falls_back_to_direct_pipeline() {
        let runner = markets_runner();
        let agent = Agent::keyword_generator("gpt-4o-mini");
        let broken = Task::new("broken", "nothing", agent.clone(), |_ctx| {
            async { Err::<CrewOutput, _>(anyhow!("orchestrator crashed")) }.boxed()
        });
        let direct_sink = MemorySink::new("results.json");
        let crew_sink = MemorySink::new("results_crewai.json");

        let results = kickoff_with_fallback(
            Crew::new(vec![agent], vec![broken]),
            &runner,
            "US financial markets",
            &direct_sink,
            &crew_sink,
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(direct_sink.written().len(), 1);
        assert_eq!(crew_sink.written().len(), 1);
        assert_eq!(crew_sink.written()[0].results, results);
    }

    #[tokio::test]
    async fn undecodable_output_falls_back_to_direct_pipeline() {
        let runner = markets_runner();
        let agent = Agent::keyword_generator("gpt-4o-mini");
        let chatty = Task::new("chatty", "text", agent.clone(), |_ctx| {
            async { Ok::<_, anyhow::Error>(CrewOutput::Raw("Found some creators!".to_string())) }
                .boxed()
        });
        let direct_sink = MemorySink::new("results.json");
        let crew_sink = MemorySink::new("results_crewai.json");

        let results = kickoff_with_fallback(
            Crew::new(vec![agent], vec![chatty]),
            &runner,
            "t",
            &direct_sink,
            &crew_sink,
        )
        .await
        .unwrap();

        assert_eq!(results[0].profile_url, "https://x.com/A");
        assert_eq!(direct_sink.written().len(), 1);
        assert_eq!(crew_sink.written()[0].topic, "t");
    }
}
