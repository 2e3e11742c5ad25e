//! Jobform - form state and validation engine for ML job wizards
//!
//! Jobform keeps the state of multi-step job-creation wizards as a nested,
//! sparse document, applies batched path mutations to it, validates it
//! against a schema with touched-field filtering, gates step navigation on
//! the result, and edits tuning hyperparameters across their wire containers.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): documents, paths, hyperparameters, wizard
//!   state and the port traits
//! - **Service Layer** (`services`): mutation reducer, touched tracking,
//!   validation, step gating, hyperparameter editing and form sessions
//! - **Forms** (`forms`): the tuning job and training definition wizards
//! - **Infrastructure Layer** (`infrastructure`): JSON schema validation,
//!   YAML catalog, configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jobform::forms::HpoJobForm;
//! use jobform::infrastructure::catalog::YamlCatalog;
//! use jobform::services::FormSession;
//!
//! fn main() -> anyhow::Result<()> {
//!     let catalog = Arc::new(YamlCatalog::builtin()?);
//!     let mut session = FormSession::new(Arc::new(HpoJobForm::new(catalog)?));
//!     session.next()?;
//!     println!("{} error(s)", session.errors().len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod forms;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, Document, ErrorTree, Hyperparameter, HyperparameterType, HyperparameterValue, Issue,
    LoggingConfig, Path, Segment, Wizard, WizardStatus,
};
pub use domain::ports::{AlgorithmCatalog, SchemaValidator};
pub use domain::{DomainError, DomainResult};
pub use forms::{FormDefinition, HpoJobForm, TrainingDefinitionForm};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{FormSession, HyperparameterEditor, MutationBatch, MutationMethod, SubmitOutcome};
