//! Table output formatting for CLI commands
//!
//! Renders error trees, catalog entries and wizard traces with comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::{AlgorithmDefinition, ErrorTree, Hyperparameter, HyperparameterDefinition};

use super::truncate;

/// One row of a replayed wizard session.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TraceRow {
    pub index: usize,
    pub event: String,
    pub step: usize,
    pub status: String,
    pub errors: usize,
    pub note: String,
}

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Flattened error tree, one row per path.
    pub fn format_errors(&self, errors: &ErrorTree) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Path").add_attribute(Attribute::Bold),
            Cell::new("Message").add_attribute(Attribute::Bold),
        ]);

        for (path, message) in errors.entries() {
            let path = if path.is_root() {
                "(document)".to_string()
            } else {
                path.to_string()
            };
            let path_cell = if self.use_colors {
                Cell::new(path).fg(Color::Yellow)
            } else {
                Cell::new(path)
            };
            let message_cell = if self.use_colors {
                Cell::new(message).fg(Color::Red)
            } else {
                Cell::new(message)
            };
            table.add_row(vec![path_cell, message_cell]);
        }

        table.to_string()
    }

    pub fn format_algorithms(&self, algorithms: &[AlgorithmDefinition]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Display name").add_attribute(Attribute::Bold),
            Cell::new("Hyperparameters").add_attribute(Attribute::Bold),
            Cell::new("Objective metrics").add_attribute(Attribute::Bold),
        ]);

        for algorithm in algorithms {
            let metrics: Vec<&str> = algorithm
                .metadata
                .objective_metrics
                .iter()
                .map(|metric| metric.name.as_str())
                .collect();
            table.add_row(vec![
                Cell::new(&algorithm.name),
                Cell::new(algorithm.display_name.as_deref().unwrap_or("-")),
                Cell::new(algorithm.hyperparameters.len()),
                Cell::new(truncate(&metrics.join(", "), 60)),
            ]);
        }

        table.to_string()
    }

    /// Catalog defaults of one algorithm.
    pub fn format_definitions(&self, definitions: &[HyperparameterDefinition]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Key").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Default").add_attribute(Attribute::Bold),
            Cell::new("Allowed types").add_attribute(Attribute::Bold),
            Cell::new("Required").add_attribute(Attribute::Bold),
        ]);

        for definition in definitions {
            let allowed = if definition.type_options.is_empty() {
                "any".to_string()
            } else {
                definition
                    .type_options
                    .iter()
                    .map(|kind| kind.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let required = if definition.required && self.use_colors {
                Cell::new("yes").fg(Color::Cyan)
            } else {
                Cell::new(if definition.required { "yes" } else { "no" })
            };
            table.add_row(vec![
                Cell::new(&definition.key),
                Cell::new(definition.kind.as_str()),
                Cell::new(truncate(&definition.value.join(", "), 40)),
                Cell::new(allowed),
                required,
            ]);
        }

        table.to_string()
    }

    /// Hyperparameters as read back from a session document.
    pub fn format_parameters(&self, parameters: &[Hyperparameter]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Key").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        for hp in parameters {
            table.add_row(vec![
                Cell::new(&hp.key),
                Cell::new(hp.kind().as_str()),
                Cell::new(truncate(&hp.value.parts().join(", "), 40)),
            ]);
        }

        table.to_string()
    }

    pub fn format_trace(&self, rows: &[TraceRow]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Event").add_attribute(Attribute::Bold),
            Cell::new("Step").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Errors").add_attribute(Attribute::Bold),
            Cell::new("Note").add_attribute(Attribute::Bold),
        ]);

        for row in rows {
            let errors_cell = if self.use_colors && row.errors > 0 {
                Cell::new(row.errors).fg(Color::Red)
            } else {
                Cell::new(row.errors)
            };
            table.add_row(vec![
                Cell::new(row.index),
                Cell::new(&row.event),
                Cell::new(row.step + 1),
                Cell::new(&row.status),
                errors_cell,
                Cell::new(truncate(&row.note, 50)),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if terminal supports colors
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Path;

    #[test]
    fn test_format_errors_lists_every_path() {
        let mut errors = ErrorTree::new();
        errors.insert(&Path::parse("HyperParameterTuningJobName").unwrap(), "Required");
        errors.insert(
            &Path::parse("TrainingJobDefinitions[0].StaticHyperParameters.num_round").unwrap(),
            "Required",
        );

        let formatter = TableFormatter::with_config(false, Some(120));
        let output = formatter.format_errors(&errors);
        assert!(output.contains("HyperParameterTuningJobName"));
        assert!(output.contains("TrainingJobDefinitions[0].StaticHyperParameters.num_round"));
    }

    #[test]
    fn test_format_trace_shows_one_based_steps() {
        let rows = vec![TraceRow {
            index: 1,
            event: "next".to_string(),
            step: 0,
            status: "active".to_string(),
            errors: 2,
            note: "blocked".to_string(),
        }];
        let output = TableFormatter::with_config(false, Some(120)).format_trace(&rows);
        assert!(output.contains("next"));
        assert!(output.contains("blocked"));
    }
}
