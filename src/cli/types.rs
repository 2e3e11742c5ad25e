//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::catalog::CatalogArgs;
use super::commands::path::PathArgs;
use super::commands::replay::ReplayArgs;
use super::commands::validate::ValidateArgs;

#[derive(Parser, Debug)]
#[command(name = "jobform")]
#[command(about = "Jobform - form state and validation engine for ML job wizards", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .jobform/config.yaml)
    #[arg(short, long, global = true, env = "JOBFORM_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a document against a form or a JSON schema
    Validate(ValidateArgs),

    /// Read or write a single path of a document
    Path(PathArgs),

    /// Browse the algorithm catalog
    Catalog(CatalogArgs),

    /// Replay a scripted wizard session
    Replay(ReplayArgs),
}
