//! `load_config` module: loads the static YAML service configuration and injects secrets
//! from the environment.
//!
//! # Responsibilities
//! - Parse the user-supplied YAML file into typed sections (every key has a default)
//! - Map it onto the immutable runtime configs: [`PipelineConfig`], [`SynthesisConfig`], [`ServerConfig`]
//! - Read `GEMINI_API_KEY` from the environment (`main` loads `.env` first); the key is
//!   never read from the YAML file
//!
//! # Errors
//! All errors use `anyhow::Error` with the file path in context and surface at the CLI boundary.
use anyhow::{Context, Result};
use serde::Deserialize;
use srs_testgen_core::config::{CompletionPolicy, PipelineConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::synthesis::SynthesisConfig;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Fully resolved configuration for one process.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub synthesis: SynthesisConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    server: ServerSection,
    synthesis: SynthesisSection,
    pipeline: PipelineSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ServerSection {
    host: String,
    port: u16,
    max_upload_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SynthesisSection {
    model: String,
    base_url: String,
    timeout_secs: u64,
}

impl Default for SynthesisSection {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PipelineSection {
    scratch_dir: Option<PathBuf>,
    extraction_timeout_secs: u64,
    completion_policy: CompletionPolicy,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            extraction_timeout_secs: 30,
            completion_policy: CompletionPolicy::Deterministic,
        }
    }
}

/// Loads the YAML file at `path`, or the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let raw = match path {
        Some(path) => read_raw_config(path)?,
        None => {
            info!("No config file given, using defaults");
            RawConfig::default()
        }
    };

    let api_key = match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => {
            info!("{API_KEY_ENV} found in env");
            Some(key)
        }
        _ => {
            warn!("{API_KEY_ENV} not set; model synthesis will be skipped and test cases derived from requirements only");
            None
        }
    };

    let synthesis_timeout = Duration::from_secs(raw.synthesis.timeout_secs);
    let config = ServiceConfig {
        server: ServerConfig {
            host: raw.server.host,
            port: raw.server.port,
            max_upload_bytes: raw.server.max_upload_bytes,
        },
        synthesis: SynthesisConfig {
            api_key,
            model: raw.synthesis.model,
            base_url: raw.synthesis.base_url,
            timeout: synthesis_timeout,
        },
        pipeline: PipelineConfig {
            scratch_dir: raw.pipeline.scratch_dir.unwrap_or_else(std::env::temp_dir),
            extraction_timeout: Duration::from_secs(raw.pipeline.extraction_timeout_secs),
            synthesis_timeout,
            completion_policy: raw.pipeline.completion_policy,
        },
    };

    info!(
        host = %config.server.host,
        port = config.server.port,
        model = %config.synthesis.model,
        "Config loaded and merged successfully"
    );
    Ok(config)
}

fn read_raw_config(path: &Path) -> Result<RawConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to read config file");
        e
    })
    .with_context(|| format!("Failed to read config file {}", path.display()))?;

    // An empty file is a valid "all defaults" configuration.
    if content.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    serde_yaml::from_str(&content)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            e
        })
        .with_context(|| format!("Failed to parse config YAML {}", path.display()))
}
