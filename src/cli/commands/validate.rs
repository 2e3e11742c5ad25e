//! Validate CLI command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::{load_catalog, load_document, FormKind};
use crate::domain::models::{Config, ErrorTree};
use crate::domain::ports::SchemaValidator;
use crate::infrastructure::validators::JsonSchemaValidator;
use crate::services::{TouchTracker, ValidationEngine};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document to validate (JSON, or YAML by extension)
    pub document: PathBuf,

    /// Built-in form whose validators apply
    #[arg(short, long, value_enum, default_value = "hpo-job", conflicts_with = "schema")]
    pub form: FormKind,

    /// Validate against a JSON schema file instead of a built-in form
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Touched tree; only issues on touched fields are reported
    #[arg(short, long)]
    pub touched: Option<PathBuf>,

    /// Report every issue even when a touched tree is given
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct ValidateOutput {
    pub document: String,
    pub valid: bool,
    pub error_count: usize,
    pub errors: ErrorTree,
}

impl CommandOutput for ValidateOutput {
    fn to_human(&self) -> String {
        if self.valid {
            return format!("{}: no errors", self.document);
        }
        format!(
            "{}: {} error(s)\n{}",
            self.document,
            self.error_count,
            TableFormatter::new().format_errors(&self.errors)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn execute(args: ValidateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let document = load_document(&args.document)?;

    let touched = match &args.touched {
        Some(path) => TouchTracker::from_document(load_document(path)?),
        None => TouchTracker::new(),
    };
    // Without a touched tree there is nothing to filter on.
    let validate_all = args.all || args.touched.is_none();

    let engine = ValidationEngine::with_separator(config.validation.message_separator.as_str());
    let schema_validator;
    let form;
    let validator: &dyn SchemaValidator = match &args.schema {
        Some(schema) => {
            schema_validator = JsonSchemaValidator::from_path(schema)
                .with_context(|| format!("Failed to load schema {}", schema.display()))?;
            &schema_validator
        }
        None => {
            form = args.form.build(load_catalog(config)?)?;
            form.validator()
        }
    };
    let errors = engine.validate(&document, validator, &touched, validate_all);
    debug!(document = %args.document.display(), errors = errors.len(), "document validated");

    let out = ValidateOutput {
        document: args.document.display().to_string(),
        valid: errors.is_empty(),
        error_count: errors.len(),
        errors,
    };
    output(&out, json_mode);
    Ok(())
}

