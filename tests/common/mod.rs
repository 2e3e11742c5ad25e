//! Common test utilities for integration tests
//!
//! Shared fixtures for the wizard, hyperparameter and CLI tests.

#![allow(dead_code)]

use std::sync::Arc;

use jobform::domain::models::{Document, Path};
use jobform::domain::ports::AlgorithmCatalog;
use jobform::forms::{HpoJobForm, TrainingDefinitionForm};
use jobform::infrastructure::catalog::YamlCatalog;
use jobform::services::{FieldMap, FormSession, HyperparameterEditor, PathAccessor};

/// The built-in algorithm catalog.
pub fn catalog() -> Arc<dyn AlgorithmCatalog> {
    Arc::new(YamlCatalog::builtin().expect("built-in catalog should load"))
}

/// Fresh tuning job session.
pub fn hpo_session() -> FormSession {
    let form = HpoJobForm::new(catalog()).expect("tuning job form should build");
    FormSession::new(Arc::new(form))
}

/// Fresh single-definition session.
pub fn training_session() -> FormSession {
    let form = TrainingDefinitionForm::new(catalog()).expect("definition form should build");
    FormSession::new(Arc::new(form))
}

/// Editor for the definition stored in slot `index` of a tuning job.
pub fn hpo_editor(index: usize) -> HyperparameterEditor {
    HyperparameterEditor::new(catalog(), HpoJobForm::definition_path(index))
}

/// Editor for a single-definition session.
pub fn root_editor() -> HyperparameterEditor {
    HyperparameterEditor::new(catalog(), Path::root())
}

pub fn path(raw: &str) -> Path {
    Path::parse(raw).expect("test path should parse")
}

/// Build a `setFields` map from `(path, json)` pairs.
pub fn fields<const N: usize>(pairs: [(&str, serde_json::Value); N]) -> FieldMap {
    pairs
        .into_iter()
        .map(|(raw, value)| (path(raw), Document::from(value)))
        .collect()
}

/// JSON value at `raw`, or `Null` when absent.
pub fn json_at(session: &FormSession, raw: &str) -> serde_json::Value {
    PathAccessor::new()
        .get(session.document(), &path(raw))
        .map(Document::to_json)
        .unwrap_or_default()
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
