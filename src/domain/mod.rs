//! Domain layer for the jobform engine
//!
//! This module contains the document, path, hyperparameter and wizard models
//! plus the port traits external collaborators implement.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{DomainError, DomainResult, HyperparameterError, PathError, PathParseError};
