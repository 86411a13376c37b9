use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// How the model completion is turned into test cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Derive cases from the filtered requirement sentences; the completion is not parsed.
    #[default]
    Deterministic,
    /// Parse the completion as a JSON array of cases, falling back to `Deterministic`
    /// when it does not parse or does not match the expected shape.
    ModelFirst,
}

/// Immutable pipeline settings, built once at start-up.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parent of the per-invocation scratch directories used during document extraction.
    pub scratch_dir: PathBuf,
    pub extraction_timeout: Duration,
    pub synthesis_timeout: Duration,
    pub completion_policy: CompletionPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
            extraction_timeout: Duration::from_secs(30),
            synthesis_timeout: Duration::from_secs(60),
            completion_policy: CompletionPolicy::Deterministic,
        }
    }
}

impl PipelineConfig {
    pub fn trace_loaded(&self) {
        info!(
            scratch_dir = %self.scratch_dir.display(),
            extraction_timeout_secs = self.extraction_timeout.as_secs(),
            synthesis_timeout_secs = self.synthesis_timeout.as_secs(),
            policy = ?self.completion_policy,
            "Loaded PipelineConfig"
        );
        debug!(?self, "PipelineConfig loaded (full debug)");
    }
}
