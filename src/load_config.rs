//! `load_config`: reads the optional YAML config file into a [`CliConfig`].
//!
//! Every section is optional and falls back to the library defaults. The
//! tesseract path may also come from the `SPLAN_TESSERACT_BIN` environment
//! variable (a `.env` file is honoured), which wins over the file.
//!
//! Accepted shape:
//!
//! ```yaml
//! settings:
//!   summary_length: short
//!   quiz_type: true-false
//!   difficulty: hard
//!   num_questions: 8
//!   num_flashcards: 12
//! ingest:
//!   max_file_size: 52428800
//!   ocr_language: eng
//!   tesseract_bin: /usr/bin/tesseract
//! export:
//!   output_dir: ./study
//! ```

use anyhow::Result;
use serde::Deserialize;
use splan_core::config::IngestConfig;
use splan_core::settings::ToolSettings;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Environment variable overriding `ingest.tesseract_bin`.
pub const TESSERACT_BIN_ENV: &str = "SPLAN_TESSERACT_BIN";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub settings: ToolSettings,
    pub ingest: IngestConfig,
    pub export: ExportSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub output_dir: PathBuf,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

/// Loads `path`, or the defaults when no path is given, then applies the
/// environment override.
pub fn resolve_config(path: Option<&Path>) -> Result<CliConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => {
            info!("No config file given, using defaults");
            CliConfig::default()
        }
    };
    apply_env(&mut config);
    Ok(config)
}

/// Parses the YAML config file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid "all defaults" config.
    if content.trim().is_empty() {
        return Ok(CliConfig::default());
    }

    let config: CliConfig = match serde_yaml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if let Err(reason) = config.settings.validate() {
        error!(%reason, "Config settings out of range");
        anyhow::bail!("Invalid settings in config: {reason}");
    }

    info!(
        config_path = ?path_ref,
        output_dir = %config.export.output_dir.display(),
        "Config loaded successfully"
    );
    Ok(config)
}

fn apply_env(config: &mut CliConfig) {
    if let Ok(bin) = std::env::var(TESSERACT_BIN_ENV) {
        if !bin.trim().is_empty() {
            info!(tesseract_bin = %bin, "Using tesseract binary from environment");
            config.ingest.tesseract_bin = PathBuf::from(bin);
        }
    }
}
