//! CLI interface for srs-testgen: command parsing and the async entry point shared by
//! `main` and the integration tests.
//!
//! All pipeline logic lives in `srs-testgen-core`; this module wires configuration,
//! collaborators and transports together.
use crate::load_config::{load_config, ServiceConfig};
use crate::server::{build_server, AppState};
use crate::synthesis::GeminiClient;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use srs_testgen_core::acquire::LopdfExtractor;
use srs_testgen_core::contract::SrsInput;
use srs_testgen_core::Pipeline;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI for srs-testgen: generate structured test cases from requirements specifications.
#[derive(Parser)]
#[clap(
    name = "srs-testgen",
    version,
    about = "Generate structured test cases from Software Requirements Specifications (PDF or text)"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the test case generation HTTP API
    Serve {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Generate test cases once and print them as JSON
    Generate {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Inline SRS text
        #[clap(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        /// Path to an SRS document (PDF)
        #[clap(long)]
        file: Option<PathBuf>,
    },
}

/// Builds the pipeline with the production collaborators: lopdf extraction and Gemini synthesis.
pub fn build_pipeline(config: &ServiceConfig) -> Result<Pipeline> {
    let synthesizer =
        GeminiClient::new(config.synthesis.clone()).context("Failed to construct synthesis client")?;
    Ok(Pipeline::new(
        config.pipeline.clone(),
        Arc::new(LopdfExtractor),
        Arc::new(synthesizer),
    ))
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Serve { config } => {
            let config = load_config(config.as_deref())?;
            tracing::info!(command = "serve", "Starting test case service");
            let state = actix_web::web::Data::new(AppState {
                pipeline: Arc::new(build_pipeline(&config)?),
                max_upload_bytes: config.server.max_upload_bytes,
            });
            build_server(state, &config.server.host, config.server.port)
                .with_context(|| {
                    format!("Failed to bind {}:{}", config.server.host, config.server.port)
                })?
                .await
                .context("HTTP server terminated with an error")?;
            tracing::info!(command = "serve", "Server stopped");
            Ok(())
        }
        Commands::Generate { config, text, file } => {
            let config = load_config(config.as_deref())?;
            let input = match (text, file) {
                (Some(text), _) => SrsInput::PlainText(text),
                (None, Some(path)) => read_document(&path)?,
                (None, None) => anyhow::bail!("either --text or --file is required"),
            };
            let pipeline = build_pipeline(&config)?;
            match pipeline.generate_test_cases(input).await {
                Ok(cases) => {
                    println!("{}", serde_json::to_string_pretty(&cases)?);
                    tracing::info!(command = "generate", test_cases = cases.len(), "Generation complete");
                    Ok(())
                }
                Err(e) => {
                    println!("{}", serde_json::json!({ "error": e.to_string() }));
                    tracing::error!(command = "generate", error = %e, "Generation failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}

fn read_document(path: &Path) -> Result<SrsInput> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(SrsInput::Document { filename, bytes })
}
