use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Message separator cannot be empty")]
    EmptyMessageSeparator,

    #[error("Catalog file not found: {0}")]
    CatalogNotFound(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .jobform/config.yaml (project config)
    /// 3. .jobform/local.yaml (project local overrides, optional)
    /// 4. Environment variables (JOBFORM_* prefix, `__` separates nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".jobform/config.yaml"))
            .merge(Yaml::file(".jobform/local.yaml"))
            .merge(Env::prefixed("JOBFORM_").split("__"))
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("JOBFORM_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.validation.message_separator.is_empty() {
            return Err(ConfigError::EmptyMessageSeparator);
        }

        if let Some(path) = &config.catalog.path {
            if !path.is_file() {
                return Err(ConfigError::CatalogNotFound(path.display().to_string()));
            }
        }

        if let Some(dir) = &config.logging.log_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "logging.log_dir cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
