//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces external collaborators implement:
//! - SchemaValidator: whole-document validation producing issues
//! - AlgorithmCatalog: read-only algorithm and hyperparameter defaults
//! - FieldValidator: per-field rule attached to a hyperparameter
//!
//! These traits keep the mutation and validation engine independent of how
//! schemas are authored or where catalog data comes from.

pub mod catalog;
pub mod field_validator;
pub mod schema_validator;

pub use catalog::AlgorithmCatalog;
pub use field_validator::FieldValidator;
pub use schema_validator::{CompositeValidator, SchemaValidator};
