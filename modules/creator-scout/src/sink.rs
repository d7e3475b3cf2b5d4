use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::ResultSet;

/// Output file of the direct pipeline.
pub const DIRECT_RESULTS_FILE: &str = "results.json";

/// Output file of the crew orchestration path.
pub const CREW_RESULTS_FILE: &str = "results_crewai.json";

/// Destination for a finished run's results.
pub trait ResultSink: Send + Sync {
    /// Label used in log lines.
    fn name(&self) -> &str;

    fn write(&self, results: &ResultSet) -> Result<()>;
}

/// Writes the result set as pretty-printed JSON, replacing any existing file.
pub struct JsonFileSink {
    path: PathBuf,
    name: String,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, results: &ResultSet) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, results)
            .with_context(|| format!("Failed to serialize results to {}", self.path.display()))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResultEntry;

    #[test]
    fn writes_pretty_topic_and_results() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join(DIRECT_RESULTS_FILE));
        let set = ResultSet {
            topic: "US financial markets".to_string(),
            results: vec![ResultEntry {
                profile_url: "https://x.com/A".to_string(),
                username: "A".to_string(),
                followers: 8000,
                tweets_last_2_weeks: 10,
                avg_posts_per_week: 5.0,
            }],
        };

        sink.write(&set).unwrap();

        let text = std::fs::read_to_string(sink.path()).unwrap();
        assert!(text.starts_with("{\n  \"topic\": \"US financial markets\""));
        let parsed: ResultSet = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn empty_results_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("out.json"));

        sink.write(&ResultSet {
            topic: "t".to_string(),
            results: vec![],
        })
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(sink.path()).unwrap()).unwrap();
        assert_eq!(value["results"], serde_json::json!([]));
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("missing").join("out.json"));
        assert!(sink
            .write(&ResultSet {
                topic: "t".to_string(),
                results: vec![],
            })
            .is_err());
    }
}
