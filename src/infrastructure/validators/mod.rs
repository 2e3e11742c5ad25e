//! Schema validator adapters

pub mod json_schema;

pub use json_schema::JsonSchemaValidator;
