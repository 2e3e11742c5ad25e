//! CLI command implementations.

pub mod catalog;
pub mod path;
pub mod replay;
pub mod validate;
