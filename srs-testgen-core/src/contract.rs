//! # contract: data model, collaborator traits and error types
//!
//! The pipeline talks to the outside world through two narrow traits:
//! - [`TextExtractor`]: turns a document on disk into per-page text.
//! - [`Synthesizer`]: turns a prompt into a raw model completion.
//!
//! Both are annotated for `mockall` so tests (in this crate and in dependants, via the
//! `test-export-mocks` feature) can generate deterministic mocks.

use std::path::Path;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of test cases returned for one invocation.
pub const MAX_TEST_CASES: usize = 10;

/// One SRS submission. Exactly one variant per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrsInput {
    /// Uploaded document bytes together with the filename declared by the client.
    Document { filename: String, bytes: Vec<u8> },
    /// Inline SRS text.
    PlainText(String),
}

/// A single generated test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub description: String,
    pub expected_result: String,
}

impl TestCase {
    /// Sequential id token for the `n`-th (1-based) case.
    pub fn id_for(n: usize) -> String {
        format!("TC{n}")
    }
}

/// Ordered, non-empty set of at most [`MAX_TEST_CASES`] test cases with ids `TC1..TCn`.
///
/// Serializes as `{"test_cases": [...]}`, which is also the response body of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseSet {
    test_cases: Vec<TestCase>,
}

impl TestCaseSet {
    /// Builds a set from descriptions and expected results, assigning ids in order.
    /// Returns `None` when `cases` is empty; anything past [`MAX_TEST_CASES`] is dropped.
    pub fn numbered<I>(cases: I) -> Option<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let test_cases: Vec<TestCase> = cases
            .into_iter()
            .take(MAX_TEST_CASES)
            .enumerate()
            .map(|(i, (description, expected_result))| TestCase {
                id: TestCase::id_for(i + 1),
                description,
                expected_result,
            })
            .collect();
        if test_cases.is_empty() {
            None
        } else {
            Some(Self { test_cases })
        }
    }

    /// A set holding exactly one case, `TC1`.
    pub fn single(description: impl Into<String>, expected_result: impl Into<String>) -> Self {
        Self {
            test_cases: vec![TestCase {
                id: TestCase::id_for(1),
                description: description.into(),
                expected_result: expected_result.into(),
            }],
        }
    }

    pub fn as_slice(&self) -> &[TestCase] {
        &self.test_cases
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }
}

/// Failure raised by a [`TextExtractor`].
#[derive(Debug, thiserror::Error)]
pub enum ExtractionFailure {
    #[error("could not load document: {0}")]
    Load(String),
    #[error("could not extract text from page {page}: {reason}")]
    Page { page: u32, reason: String },
}

/// Failure raised by a [`Synthesizer`]. Never surfaced to callers of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("no API key configured for the generative model")]
    MissingCredentials,
    #[error("request to generative model failed: {0}")]
    Transport(String),
    #[error("generative model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response from generative model: {0}")]
    MalformedResponse(String),
    #[error("generative model did not answer within {0:?}")]
    Timeout(std::time::Duration),
}

/// Fatal failures while obtaining SRS text.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("Only PDF files are supported")]
    UnsupportedFormat { filename: String },
    #[error("Failed to extract text from PDF: {0}")]
    Extraction(String),
    #[error("No SRS text provided or extracted")]
    EmptyInput,
    #[error("Failed to stage uploaded document: {0}")]
    Scratch(#[from] std::io::Error),
}

impl From<ExtractionFailure> for AcquisitionError {
    fn from(e: ExtractionFailure) -> Self {
        AcquisitionError::Extraction(e.to_string())
    }
}

/// Errors returned by [`crate::Pipeline::generate_test_cases`] and by the transport layers.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// True for conditions caused by the submitted input rather than by the service.
    pub fn is_client_fault(&self) -> bool {
        match self {
            PipelineError::Acquisition(AcquisitionError::Scratch(_)) => false,
            PipelineError::Acquisition(_) => true,
            PipelineError::Internal(_) => false,
        }
    }
}

/// Extracts text from a document stored at `path`, one entry per page in page order.
///
/// Called on the blocking thread pool; implementations may block.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait TextExtractor: Send + Sync {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionFailure>;
}

/// Produces a raw text completion for a prompt from an external generative model.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, prompt: &str) -> Result<String, SynthesisError>;
}
