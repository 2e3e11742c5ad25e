//! Path CLI commands: read or write one location of a document.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::cli::{load_document, parse_value};
use crate::domain::models::{Document, Path};
use crate::services::{MutationBatch, MutationMethod, MutationReducer, PathAccessor};

#[derive(Args, Debug)]
pub struct PathArgs {
    #[command(subcommand)]
    pub command: PathCommands,
}

#[derive(Subcommand, Debug)]
pub enum PathCommands {
    /// Print the value at a path
    Get {
        /// Document file (JSON, or YAML by extension)
        document: PathBuf,
        /// Path such as `TrainingJobDefinitions[0].DefinitionName`
        path: Path,
    },
    /// Write a value and print the updated document
    Set {
        /// Document file (JSON, or YAML by extension)
        document: PathBuf,
        /// Target path
        path: Path,
        /// JSON value; anything that does not parse is taken as a string
        value: Option<String>,
        /// How the value is written (set, merge, unset)
        #[arg(short, long, default_value = "set", value_parser = parse_method)]
        method: MutationMethod,
        /// Write the result back into the document file
        #[arg(short, long)]
        in_place: bool,
    },
}

fn parse_method(raw: &str) -> Result<MutationMethod, String> {
    match raw.to_lowercase().as_str() {
        "set" | "default" => Ok(MutationMethod::Set),
        "merge" => Ok(MutationMethod::Merge),
        "unset" => Ok(MutationMethod::Unset),
        _ => Err(format!("unknown method '{raw}' (expected set, merge or unset)")),
    }
}

#[derive(Debug, serde::Serialize)]
pub struct PathValueOutput {
    pub path: String,
    pub found: bool,
    pub value: serde_json::Value,
}

impl CommandOutput for PathValueOutput {
    fn to_human(&self) -> String {
        if !self.found {
            return format!("{}: not set", self.path);
        }
        serde_json::to_string_pretty(&self.value).unwrap_or_default()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct PathUpdateOutput {
    pub path: String,
    pub method: String,
    pub written: Option<String>,
    pub document: serde_json::Value,
}

impl CommandOutput for PathUpdateOutput {
    fn to_human(&self) -> String {
        match &self.written {
            Some(file) => format!("{} {} in {}", self.method, self.path, file),
            None => serde_json::to_string_pretty(&self.document).unwrap_or_default(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn execute(args: PathArgs, json_mode: bool) -> Result<()> {
    match args.command {
        PathCommands::Get { document, path } => {
            let doc = load_document(&document)?;
            let value = PathAccessor::new().get(&doc, &path);
            let out = PathValueOutput {
                path: path.to_string(),
                found: value.is_some(),
                value: value.map(Document::to_json).unwrap_or_default(),
            };
            output(&out, json_mode);
        }

        PathCommands::Set {
            document,
            path,
            value,
            method,
            in_place,
        } => {
            let value = match (method, value) {
                (MutationMethod::Unset, _) => Document::Null,
                (_, Some(raw)) => parse_value(&raw),
                (_, None) => anyhow::bail!("A value is required for method '{}'", method.as_str()),
            };

            let doc = load_document(&document)?;
            let mut batch = MutationBatch::new();
            batch.push(path.clone(), method, value);
            let updated = MutationReducer::new()
                .apply(&doc, &batch)
                .with_context(|| format!("Failed to {} '{}'", method.as_str(), path))?;

            let json = updated.to_json();
            let written = if in_place {
                write_document(&document, &json)?;
                Some(document.display().to_string())
            } else {
                None
            };

            let out = PathUpdateOutput {
                path: path.to_string(),
                method: method.as_str().to_string(),
                written,
                document: json,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}

fn write_document(file: &std::path::Path, value: &serde_json::Value) -> Result<()> {
    let is_yaml = file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "yaml" | "yml"));
    let content = if is_yaml {
        serde_yaml::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    std::fs::write(file, content).with_context(|| format!("Failed to write {}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("Merge").unwrap(), MutationMethod::Merge);
        assert_eq!(parse_method("default").unwrap(), MutationMethod::Set);
        assert!(parse_method("append").is_err());
    }

    #[test]
    fn test_set_in_place_rewrites_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"TrainingJobDefinitions": [{{"DefinitionName": "a"}}]}}"#).unwrap();

        let args = PathArgs {
            command: PathCommands::Set {
                document: file.path().to_path_buf(),
                path: Path::parse("TrainingJobDefinitions[0].DefinitionName").unwrap(),
                value: Some("renamed".to_string()),
                method: MutationMethod::Set,
                in_place: true,
            },
        };
        execute(args, true).unwrap();

        let doc = load_document(file.path()).unwrap();
        let name = PathAccessor::new()
            .get(&doc, &Path::parse("TrainingJobDefinitions[0].DefinitionName").unwrap())
            .and_then(Document::as_str)
            .map(str::to_string);
        assert_eq!(name.as_deref(), Some("renamed"));
    }
}
