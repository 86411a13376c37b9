//! High-level pipeline: acquire → filter → prompt → synthesize → normalize.
//!
//! [`Pipeline::generate_test_cases`] is the single entry point used by the HTTP service and
//! the CLI. Invocations share no mutable state; a `Pipeline` can be wrapped in an `Arc`
//! and driven concurrently.
//!
//! # Error Handling
//! Acquisition failures end the invocation and are returned to the caller. Synthesis
//! failures (transport, status, timeout, missing credentials) are logged and absorbed:
//! normalization then works from the filtered requirements alone, so a request whose text
//! could be acquired always yields a non-empty [`TestCaseSet`].

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::acquire::TextAcquirer;
use crate::config::PipelineConfig;
use crate::contract::{
    PipelineError, SrsInput, SynthesisError, Synthesizer, TestCaseSet, TextExtractor,
};
use crate::filter::filter_requirements;
use crate::normalize::normalize;
use crate::prompt::{build_prompt, prompt_basis};

pub struct Pipeline {
    acquirer: TextAcquirer,
    synthesizer: Arc<dyn Synthesizer>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        extractor: Arc<dyn TextExtractor>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        config.trace_loaded();
        Self {
            acquirer: TextAcquirer::new(extractor, &config),
            synthesizer,
            config,
        }
    }

    pub async fn generate_test_cases(&self, input: SrsInput) -> Result<TestCaseSet, PipelineError> {
        info!("[PIPELINE] Starting test case generation");

        let text = match self.acquirer.acquire(input).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "[PIPELINE][ERROR] Acquisition failed");
                return Err(e.into());
            }
        };

        let requirements = filter_requirements(&text);
        info!(
            requirements = requirements.len(),
            chars = text.len(),
            "[PIPELINE] Filtered requirement sentences"
        );

        let prompt = build_prompt(&prompt_basis(&requirements, &text));
        debug!(prompt_chars = prompt.len(), "[PIPELINE] Built synthesis prompt");

        let completion = match self.synthesize(&prompt).await {
            Ok(completion) => {
                info!(chars = completion.len(), "[PIPELINE] Synthesis succeeded");
                Some(completion)
            }
            Err(e) => {
                warn!(error = %e, "[PIPELINE] Synthesis failed; continuing without model output");
                None
            }
        };

        let cases = normalize(
            &requirements,
            completion.as_deref(),
            self.config.completion_policy,
        );
        info!(test_cases = cases.len(), "[PIPELINE] Test case generation complete");
        Ok(cases)
    }

    async fn synthesize(&self, prompt: &str) -> Result<String, SynthesisError> {
        let timeout = self.config.synthesis_timeout;
        match tokio::time::timeout(timeout, self.synthesizer.synthesize(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(SynthesisError::Timeout(timeout)),
        }
    }
}
