//! Domain errors for the jobform engine.
//!
//! Everything in here is a programmer error: a malformed path, a mutation
//! batch that does not fit the document, or an illegal wizard transition.
//! User-input problems are never errors; they surface as `ErrorTree` entries.

use thiserror::Error;

use crate::domain::models::hyperparameter::HyperparameterType;

/// A path string that does not follow the `a.b[0].c` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid path '{input}' at position {position}: {reason}")]
pub struct PathParseError {
    pub input: String,
    pub position: usize,
    pub reason: String,
}

/// Structural errors raised while walking a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Cannot descend into scalar at '{at}' while resolving '{path}'")]
    NotAContainer { path: String, at: String },

    #[error("Segment mismatch at '{at}' while resolving '{path}': expected {expected}")]
    SegmentMismatch {
        path: String,
        at: String,
        expected: &'static str,
    },

    #[error("Index {index} in '{path}' would grow a sequence past {limit} slots")]
    IndexOutOfRange {
        path: String,
        index: usize,
        limit: usize,
    },

    #[error(transparent)]
    Parse(#[from] PathParseError),
}

/// Errors raised by the hyperparameter model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HyperparameterError {
    #[error("Hyperparameter '{key}' does not allow type {requested:?}")]
    TypeNotAllowed {
        key: String,
        requested: HyperparameterType,
    },

    #[error("Hyperparameter '{0}' already exists")]
    DuplicateKey(String),

    #[error("Hyperparameter '{0}' not found")]
    UnknownKey(String),

    #[error("Algorithm not found in catalog: {0}")]
    UnknownAlgorithm(String),

    #[error("Hyperparameter key cannot be empty")]
    EmptyKey,
}

/// Domain-level errors that can occur in the form engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Cannot merge {value} into {target} at '{path}'")]
    MergeMismatch {
        path: String,
        target: &'static str,
        value: &'static str,
    },

    #[error(transparent)]
    Hyperparameter(#[from] HyperparameterError),

    #[error("Invalid step {requested}: only steps 0..={furthest} are reachable")]
    InvalidStep { requested: usize, furthest: usize },

    #[error("Invalid wizard transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Form session {0} is closed")]
    SessionClosed(String),

    #[error("Submission payload rejected: {0}")]
    Submission(String),
}

impl From<PathParseError> for DomainError {
    fn from(err: PathParseError) -> Self {
        Self::Path(PathError::Parse(err))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
