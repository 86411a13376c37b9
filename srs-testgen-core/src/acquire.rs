//! # acquire: obtaining SRS text from inline text or an uploaded PDF
//!
//! Documents are written into a scratch directory that is unique to the invocation
//! (`tempfile::TempDir` under [`PipelineConfig::scratch_dir`]) and removed before
//! [`TextAcquirer::acquire`] returns, whichever way it returns. The client-declared
//! filename is only used for the format check, never as a path component.
//!
//! Extraction runs on the blocking pool under [`PipelineConfig::extraction_timeout`].
//! A blocking task cannot be cancelled, so on timeout the extractor keeps running
//! detached until it finishes on its own. The scratch directory is still removed right
//! away, so a straggler may find its staged file gone. Its result is dropped.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::contract::{AcquisitionError, ExtractionFailure, SrsInput, TextExtractor};

const SCRATCH_PREFIX: &str = "srs-upload-";
const STAGED_DOCUMENT_NAME: &str = "document.pdf";

/// Default [`TextExtractor`] backed by `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractionFailure> {
        let document =
            lopdf::Document::load(path).map_err(|e| ExtractionFailure::Load(e.to_string()))?;

        let mut pages = Vec::new();
        for page_number in document.get_pages().into_keys() {
            let text = document
                .extract_text(&[page_number])
                .map_err(|e| ExtractionFailure::Page {
                    page: page_number,
                    reason: e.to_string(),
                })?;
            debug!(page = page_number, chars = text.len(), "Extracted page text");
            pages.push(text);
        }
        Ok(pages)
    }
}

/// True when the declared filename marks a PDF. Case-sensitive.
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.ends_with(".pdf")
}

pub struct TextAcquirer {
    extractor: Arc<dyn TextExtractor>,
    scratch_dir: PathBuf,
    extraction_timeout: Duration,
}

impl TextAcquirer {
    pub fn new(extractor: Arc<dyn TextExtractor>, config: &PipelineConfig) -> Self {
        Self {
            extractor,
            scratch_dir: config.scratch_dir.clone(),
            extraction_timeout: config.extraction_timeout,
        }
    }

    /// Returns the raw SRS text, unchanged for inline text and page texts joined by `\n`
    /// for documents. Blank results are rejected with [`AcquisitionError::EmptyInput`].
    pub async fn acquire(&self, input: SrsInput) -> Result<String, AcquisitionError> {
        let text = match input {
            SrsInput::PlainText(text) => {
                debug!(chars = text.len(), "[ACQUIRE] Using inline SRS text");
                text
            }
            SrsInput::Document { filename, bytes } => {
                self.extract_document(&filename, &bytes).await?
            }
        };

        if text.trim().is_empty() {
            warn!("[ACQUIRE] SRS text is empty after acquisition");
            return Err(AcquisitionError::EmptyInput);
        }
        Ok(text)
    }

    async fn extract_document(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, AcquisitionError> {
        if !is_pdf_filename(filename) {
            warn!(filename, "[ACQUIRE] Rejected upload with unsupported format");
            return Err(AcquisitionError::UnsupportedFormat {
                filename: filename.to_owned(),
            });
        }

        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&self.scratch_dir)?;
        let staged = scratch.path().join(STAGED_DOCUMENT_NAME);
        tokio::fs::write(&staged, bytes).await?;
        info!(
            filename,
            size = bytes.len(),
            scratch = %scratch.path().display(),
            "[ACQUIRE] Staged uploaded document for extraction"
        );

        let pages = self.run_extractor(staged).await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            error!(error = ?e, scratch = %scratch_path.display(), "[ACQUIRE] Failed to remove scratch directory");
        }

        let pages = pages.map_err(|e| {
            error!(filename, error = %e, "[ACQUIRE] Text extraction failed");
            e
        })?;
        info!(filename, pages = pages.len(), "[ACQUIRE] Extracted text from document");
        Ok(pages.join("\n"))
    }

    async fn run_extractor(&self, staged: PathBuf) -> Result<Vec<String>, AcquisitionError> {
        let extractor = Arc::clone(&self.extractor);
        let task = tokio::task::spawn_blocking(move || extractor.extract_pages(&staged));

        match tokio::time::timeout(self.extraction_timeout, task).await {
            Ok(Ok(result)) => result.map_err(AcquisitionError::from),
            Ok(Err(join_error)) => Err(AcquisitionError::Extraction(format!(
                "extraction task failed: {join_error}"
            ))),
            Err(_) => Err(AcquisitionError::Extraction(format!(
                "timed out after {:?}",
                self.extraction_timeout
            ))),
        }
    }
}
