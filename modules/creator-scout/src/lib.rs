pub mod activity;
pub mod collector;
pub mod config;
pub mod crew;
pub mod execution;
pub mod filter;
pub mod keywords;
pub mod pipeline;
pub mod sink;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod types;

pub use config::{AppConfig, ExecutionMode};
pub use pipeline::PipelineRunner;
pub use types::{Candidate, CandidateMap, ResultEntry, ResultSet, Thresholds};

/// Topic searched by the binary.
pub const DEFAULT_TOPIC: &str = "US financial markets";
