//! Typed wizard definitions.
//!
//! The engine in `services` is generic over [`Document`]; a form definition
//! supplies everything concrete about one wizard: its steps, its starting
//! document, its validator and the shape check run on submission.

pub mod hpo_job;
pub mod training_definition;

pub use hpo_job::{HpoJobForm, HpoJobRequest};
pub use training_definition::{placeholder_definition, TrainingDefinitionForm, TrainingJobDefinition};

use serde_json::Value;

use crate::domain::errors::DomainResult;
use crate::domain::models::document::Document;
use crate::domain::models::wizard::WizardStep;
use crate::domain::ports::SchemaValidator;

/// One concrete multi-step form.
pub trait FormDefinition: Send + Sync {
    /// Short identifier, used in logs.
    fn name(&self) -> &str;

    fn steps(&self) -> Vec<WizardStep>;

    /// Document a fresh session starts from.
    fn initial_document(&self) -> Document;

    /// Validator run on every mutation.
    fn validator(&self) -> &dyn SchemaValidator;

    /// Build the wire payload from a document that passed validation.
    ///
    /// Holes are dropped here and nowhere else.
    fn prepare_submission(&self, doc: &Document) -> DomainResult<Value>;
}
