pub mod catalog;
pub mod config;
pub mod document;
pub mod hyperparameter;
pub mod issue;
pub mod path;
pub mod wizard;

pub use catalog::{
    AlgorithmDefinition, AlgorithmMetadata, HyperparameterDefinition, ObjectiveMetric,
    ObjectiveType, ValueConstraint,
};
pub use config::{CatalogConfig, Config, LogFormat, LoggingConfig, RotationPolicy, ValidationConfig};
pub use document::{Document, Record};
pub use hyperparameter::{
    Bound, Hyperparameter, HyperparameterIssue, HyperparameterType, HyperparameterValue,
    IssueTarget, ScalingType,
};
pub use issue::{ErrorTree, Issue};
pub use path::{Path, Segment};
pub use wizard::{StepTransition, Wizard, WizardStatus, WizardStep};
