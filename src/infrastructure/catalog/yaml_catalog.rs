//! Algorithm catalog loaded from YAML

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::domain::models::catalog::AlgorithmDefinition;
use crate::domain::ports::AlgorithmCatalog;

const BUILTIN_CATALOG: &str = include_str!("../../../data/catalog.yaml");

/// On-disk layout of a catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub algorithms: Vec<AlgorithmDefinition>,
}

/// Read-only catalog backed by a YAML document
#[derive(Debug, Clone)]
pub struct YamlCatalog {
    algorithms: Vec<AlgorithmDefinition>,
}

impl YamlCatalog {
    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_str(BUILTIN_CATALOG).context("Built-in catalog is invalid")
    }

    /// Load a catalog from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading algorithm catalog from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Load a catalog from a YAML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(yaml: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml).context("Failed to parse catalog YAML")?;
        Self::from_definitions(file.algorithms)
    }

    /// Build a catalog from already parsed definitions
    pub fn from_definitions(algorithms: Vec<AlgorithmDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for algorithm in &algorithms {
            if !seen.insert(algorithm.name.as_str()) {
                anyhow::bail!("Duplicate algorithm in catalog: {}", algorithm.name);
            }
            let mut keys = HashSet::new();
            for def in &algorithm.hyperparameters {
                if def.key.is_empty() {
                    anyhow::bail!("Algorithm {} has a hyperparameter with an empty key", algorithm.name);
                }
                if !keys.insert(def.key.as_str()) {
                    anyhow::bail!(
                        "Algorithm {} defines hyperparameter {} twice",
                        algorithm.name,
                        def.key
                    );
                }
                if !def.type_options.is_empty() && !def.type_options.contains(&def.kind) {
                    anyhow::bail!(
                        "Algorithm {}: default type {} of {} is not among its type options",
                        algorithm.name,
                        def.kind,
                        def.key
                    );
                }
            }
        }

        info!(algorithms = algorithms.len(), "Algorithm catalog loaded");
        Ok(Self { algorithms })
    }

    pub fn algorithms(&self) -> &[AlgorithmDefinition] {
        &self.algorithms
    }
}

impl AlgorithmCatalog for YamlCatalog {
    fn algorithm(&self, name: &str) -> Option<&AlgorithmDefinition> {
        self.algorithms.iter().find(|a| a.name == name)
    }

    fn names(&self) -> Vec<&str> {
        self.algorithms.iter().map(|a| a.name.as_str()).collect()
    }
}
