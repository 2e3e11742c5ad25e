//! Algorithm catalog adapters

pub mod yaml_catalog;

pub use yaml_catalog::{CatalogFile, YamlCatalog};
