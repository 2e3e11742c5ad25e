//! Infrastructure layer: adapters for the domain ports plus the ambient
//! configuration and logging setup.

pub mod catalog;
pub mod config;
pub mod logging;
pub mod validators;
