//! Catalog CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::load_catalog;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::errors::HyperparameterError;
use crate::domain::models::{AlgorithmDefinition, Config};

#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List the algorithms in the catalog
    List,
    /// Show the default hyperparameters of one algorithm
    Show {
        /// Algorithm name
        algorithm: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct CatalogListOutput {
    pub algorithms: Vec<AlgorithmDefinition>,
    pub total: usize,
}

impl CommandOutput for CatalogListOutput {
    fn to_human(&self) -> String {
        if self.algorithms.is_empty() {
            return "No algorithms found.".to_string();
        }
        format!(
            "Found {} algorithm(s):\n{}",
            self.total,
            TableFormatter::new().format_algorithms(&self.algorithms)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct AlgorithmDetailOutput {
    pub algorithm: AlgorithmDefinition,
}

impl CommandOutput for AlgorithmDetailOutput {
    fn to_human(&self) -> String {
        let algorithm = &self.algorithm;
        let mut lines = vec![format!("Algorithm: {}", algorithm.name)];
        if let Some(display_name) = &algorithm.display_name {
            lines.push(format!("Display name: {display_name}"));
        }
        if let Some(image) = &algorithm.training_image {
            lines.push(format!("Training image: {image}"));
        }

        if !algorithm.metadata.objective_metrics.is_empty() {
            lines.push("\nObjective metrics:".to_string());
            for metric in &algorithm.metadata.objective_metrics {
                match metric.kind {
                    Some(kind) => lines.push(format!("  - {} ({kind:?})", metric.name)),
                    None => lines.push(format!("  - {}", metric.name)),
                }
            }
        }

        lines.push("\nHyperparameters:".to_string());
        lines.push(TableFormatter::new().format_definitions(&algorithm.hyperparameters));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn execute(args: CatalogArgs, config: &Config, json_mode: bool) -> Result<()> {
    let catalog = load_catalog(config)?;

    match args.command {
        CatalogCommands::List => {
            let algorithms: Vec<AlgorithmDefinition> = catalog
                .names()
                .into_iter()
                .filter_map(|name| catalog.algorithm(name).cloned())
                .collect();
            let out = CatalogListOutput {
                total: algorithms.len(),
                algorithms,
            };
            output(&out, json_mode);
        }

        CatalogCommands::Show { algorithm } => {
            let definition = catalog
                .algorithm(&algorithm)
                .cloned()
                .ok_or(HyperparameterError::UnknownAlgorithm(algorithm))?;
            output(&AlgorithmDetailOutput { algorithm: definition }, json_mode);
        }
    }

    Ok(())
}
