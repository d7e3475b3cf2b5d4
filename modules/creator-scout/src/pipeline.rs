use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::activity::ActivityMeasurer;
use crate::collector::CandidateCollector;
use crate::filter::filter_candidates;
use crate::keywords::{KeywordGenerator, DEFAULT_KEYWORD_COUNT};
use crate::sink::ResultSink;
use crate::traits::{SocialPlatform, TextGenerator};
use crate::types::{ResultEntry, ResultSet, Thresholds};

/// Direct execution of the discovery pipeline:
/// keywords → candidates → activity → filter → sink.
///
/// Every stage runs to completion before the next starts and every external
/// call is awaited one at a time.
pub struct PipelineRunner {
    keywords: KeywordGenerator,
    collector: CandidateCollector,
    measurer: ActivityMeasurer,
    thresholds: Thresholds,
    keyword_count: usize,
}

impl PipelineRunner {
    pub fn new(generator: Arc<dyn TextGenerator>, platform: Arc<dyn SocialPlatform>) -> Self {
        Self {
            keywords: KeywordGenerator::new(generator),
            collector: CandidateCollector::new(platform.clone()),
            measurer: ActivityMeasurer::new(platform),
            thresholds: Thresholds::default(),
            keyword_count: DEFAULT_KEYWORD_COUNT,
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Run all four stages and return the qualifying creators without
    /// persisting them.
    pub async fn discover(&self, topic: &str) -> Vec<ResultEntry> {
        let keywords = self.keywords.generate(topic, self.keyword_count).await;
        let candidates = self.collector.collect(&keywords).await;
        let activity = self.measurer.measure_all(&candidates).await;
        let results = filter_candidates(&candidates, &activity, &self.thresholds);

        info!(
            topic,
            candidates = candidates.len(),
            qualifying = results.len(),
            "Discovery complete"
        );
        results
    }

    /// Discover and write `{topic, results}` to the sink.
    pub async fn run(&self, topic: &str, sink: &dyn ResultSink) -> Result<Vec<ResultEntry>> {
        let results = self.discover(topic).await;
        let set = ResultSet {
            topic: topic.to_string(),
            results,
        };
        sink.write(&set)?;
        info!("saved {} users to {}", set.results.len(), sink.name());
        Ok(set.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{user, MemorySink, MockPlatform, ScriptedGenerator};

    #[tokio::test]
    async fn run_persists_topic_with_results() {
        let platform = MockPlatform::new()
            .on_search("stocks", vec![user("1", "A", 8000)])
            .on_posts("1", 10);
        let runner = PipelineRunner::new(
            Arc::new(ScriptedGenerator::reply(r#"["stocks"]"#)),
            Arc::new(platform),
        );
        let sink = MemorySink::new("memory");

        let results = runner.run("US financial markets", &sink).await.unwrap();

        let written = sink.written();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].topic, "US financial markets");
        assert_eq!(written[0].results, results);
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn fallback_keywords_drive_search_when_generation_fails() {
        let platform = Arc::new(MockPlatform::new());
        let runner = PipelineRunner::new(
            Arc::new(ScriptedGenerator::failing("timeout")),
            platform.clone(),
        );

        let results = runner.discover("anything").await;

        assert!(results.is_empty());
        let queries: Vec<String> = platform.searches().into_iter().map(|p| p.query).collect();
        assert_eq!(
            queries,
            vec![
                "US stock market -is:retweet lang:en",
                "Wall Street -is:retweet lang:en",
                "S&P 500 -is:retweet lang:en",
            ]
        );
    }

    #[tokio::test]
    async fn measures_every_candidate_even_below_follower_floor() {
        let platform = Arc::new(
            MockPlatform::new()
                .on_search("a", vec![user("1", "small", 10), user("2", "big", 9000)])
                .on_posts("1", 50)
                .on_posts("2", 1),
        );
        let runner = PipelineRunner::new(
            Arc::new(ScriptedGenerator::reply(r#"["a"]"#)),
            platform.clone(),
        );

        let results = runner.discover("t").await;

        assert!(results.is_empty());
        assert_eq!(platform.timelines().len(), 2);
    }

    #[tokio::test]
    async fn custom_thresholds_reach_the_filter() {
        let platform = MockPlatform::new()
            .on_search("a", vec![user("1", "small", 10)])
            .on_posts("1", 1);
        let runner = PipelineRunner::new(
            Arc::new(ScriptedGenerator::reply(r#"["a"]"#)),
            Arc::new(platform),
        )
        .with_thresholds(Thresholds {
            min_followers: 1,
            min_posts: 1,
        });

        assert_eq!(runner.discover("t").await.len(), 1);
    }
}
