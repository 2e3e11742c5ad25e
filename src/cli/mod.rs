//! Command-line interface for jobform.
//!
//! The CLI drives the form engine against documents on disk: validating
//! them, reading and writing single paths, browsing the algorithm catalog,
//! and replaying scripted wizard sessions.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::Path as FsPath;
use std::sync::Arc;

use crate::domain::models::document::Document;
use crate::domain::models::Config;
use crate::domain::ports::AlgorithmCatalog;
use crate::forms::{FormDefinition, HpoJobForm, TrainingDefinitionForm};
use crate::infrastructure::catalog::YamlCatalog;

/// Built-in forms selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    /// Hyperparameter tuning job wizard
    HpoJob,
    /// Single training job definition wizard
    TrainingDefinition,
}

impl FormKind {
    pub fn build(self, catalog: Arc<dyn AlgorithmCatalog>) -> Result<Arc<dyn FormDefinition>> {
        let form: Arc<dyn FormDefinition> = match self {
            Self::HpoJob => Arc::new(HpoJobForm::new(catalog)?),
            Self::TrainingDefinition => Arc::new(TrainingDefinitionForm::new(catalog)?),
        };
        Ok(form)
    }
}

/// Catalog named by the config, or the built-in one.
pub fn load_catalog(config: &Config) -> Result<Arc<dyn AlgorithmCatalog>> {
    let catalog = match &config.catalog.path {
        Some(path) => YamlCatalog::from_path(path)?,
        None => YamlCatalog::builtin()?,
    };
    Ok(Arc::new(catalog))
}

/// Read a JSON or YAML document; the extension picks the parser.
pub fn load_document(path: &FsPath) -> Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    parse_document(path, &content)
}

fn parse_document(path: &FsPath, content: &str) -> Result<Document> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "yaml" | "yml"));

    let value: serde_json::Value = if is_yaml {
        serde_yaml::from_str(content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    };
    Ok(value.into())
}

/// Parse a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Document {
    serde_json::from_str::<serde_json::Value>(raw)
        .map_or_else(|_| Document::string(raw), Document::from)
}

/// Print a failed command and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": chain.get(1..).unwrap_or_default(),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
