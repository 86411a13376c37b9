#![doc = "Gemini-backed implementation of the core `Synthesizer` contract."]
//
//! # Synthesis client
//!
//! [`GeminiClient`] sends the pipeline prompt to the Gemini `generateContent` endpoint and
//! returns the text of the first candidate. Every failure is mapped onto
//! [`SynthesisError`]; the pipeline absorbs those, so nothing here is fatal to a request.
//!
//! The client is built once from an immutable [`SynthesisConfig`]. The request timeout
//! lives in that config and bounds every call.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use srs_testgen_core::contract::{SynthesisError, Synthesizer};

/// Model endpoint settings. `api_key` comes from the environment, never from config files.
#[derive(Clone)]
pub struct SynthesisConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for SynthesisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisConfig")
            .field("api_key_set", &self.api_key.is_some())
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    client: reqwest::Client,
    config: SynthesisConfig,
}

impl GeminiClient {
    pub fn new(config: SynthesisConfig) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SynthesisError::Transport(format!("could not build HTTP client: {e}")))?;
        tracing::info!(
            model = %config.model,
            api_key_set = config.api_key.is_some(),
            timeout_secs = config.timeout.as_secs(),
            "Initialized GeminiClient"
        );
        Ok(Self { client, config })
    }

    /// `{base_url}/{model}:generateContent`, without the key.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model.trim()
        )
    }
}

#[async_trait]
impl Synthesizer for GeminiClient {
    async fn synthesize(&self, prompt: &str) -> Result<String, SynthesisError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(SynthesisError::MissingCredentials)?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::info!(model = %self.config.model, prompt_chars = prompt.len(), "Requesting completion");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout(self.config.timeout)
                } else {
                    SynthesisError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Generative model returned an error status");
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::MalformedResponse(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| SynthesisError::MalformedResponse("no candidate text".to_string()))?;

        tracing::info!(chars = text.len(), "Received completion");
        Ok(text)
    }
}
