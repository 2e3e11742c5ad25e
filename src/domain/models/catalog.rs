//! Algorithm catalog model.
//!
//! The catalog is read-only reference data: per algorithm, the default
//! hyperparameter definitions used to seed a wizard session and the objective
//! metrics offered by the tuning-objective selector.

use serde::{Deserialize, Serialize};

use super::hyperparameter::{Hyperparameter, HyperparameterType, HyperparameterValue, ScalingType};
use crate::domain::ports::FieldValidator;

/// Declarative per-field rule attached to a catalog hyperparameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueConstraint {
    Integer {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    Continuous {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Enumeration {
        options: Vec<String>,
    },
    FreeText {
        #[serde(default)]
        max_length: Option<usize>,
    },
}

impl FieldValidator for ValueConstraint {
    fn check(&self, value: &str) -> Result<(), String> {
        let trimmed = value.trim();
        match self {
            Self::Integer { min, max } => {
                let parsed: i64 = trimmed
                    .parse()
                    .map_err(|_| format!("'{value}' is not an integer"))?;
                if let Some(min) = min {
                    if parsed < *min {
                        return Err(format!("must be greater than or equal to {min}"));
                    }
                }
                if let Some(max) = max {
                    if parsed > *max {
                        return Err(format!("must be less than or equal to {max}"));
                    }
                }
                Ok(())
            }
            Self::Continuous { min, max } => {
                let parsed: f64 = trimmed
                    .parse()
                    .ok()
                    .filter(|v: &f64| v.is_finite())
                    .ok_or_else(|| format!("'{value}' is not a number"))?;
                if let Some(min) = min {
                    if parsed < *min {
                        return Err(format!("must be greater than or equal to {min}"));
                    }
                }
                if let Some(max) = max {
                    if parsed > *max {
                        return Err(format!("must be less than or equal to {max}"));
                    }
                }
                Ok(())
            }
            Self::Enumeration { options } => {
                if options.iter().any(|option| option == trimmed) {
                    Ok(())
                } else {
                    Err(format!("must be one of: {}", options.join(", ")))
                }
            }
            Self::FreeText { max_length } => match max_length {
                Some(limit) if value.chars().count() > *limit => {
                    Err(format!("must be at most {limit} characters"))
                }
                _ => Ok(()),
            },
        }
    }
}

/// Default definition of one hyperparameter for an algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterDefinition {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: HyperparameterType,
    /// Flat default value: `[v]`, `[min, max]` or the category list.
    #[serde(default)]
    pub value: Vec<String>,
    #[serde(default)]
    pub type_options: Vec<HyperparameterType>,
    #[serde(default)]
    pub scaling_type: Option<ScalingType>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub constraint: Option<ValueConstraint>,
    #[serde(default)]
    pub required: bool,
}

impl HyperparameterDefinition {
    /// Seed a fresh hyperparameter from this definition.
    pub fn to_hyperparameter(&self) -> Hyperparameter {
        let scaling = self.scaling_type.unwrap_or_default();
        let mut hp = Hyperparameter::new(
            self.key.clone(),
            HyperparameterValue::from_parts(self.kind, &self.value, scaling),
        );
        self.apply_metadata(&mut hp);
        hp
    }

    /// Attach catalog metadata to a hyperparameter read from a document.
    pub fn apply_metadata(&self, hp: &mut Hyperparameter) {
        hp.type_options.clone_from(&self.type_options);
        hp.default_scaling = self.scaling_type.unwrap_or_default();
        hp.options.clone_from(&self.options);
        hp.constraint.clone_from(&self.constraint);
        hp.required = self.required;
    }
}

/// Direction of a tuning objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveType {
    Maximize,
    Minimize,
}

/// Metric an algorithm emits that can be used as the tuning objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveMetric {
    pub name: String,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<ObjectiveType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmMetadata {
    #[serde(default)]
    pub objective_metrics: Vec<ObjectiveMetric>,
}

/// One built-in algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmDefinition {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub training_image: Option<String>,
    #[serde(default)]
    pub metadata: AlgorithmMetadata,
    #[serde(default)]
    pub hyperparameters: Vec<HyperparameterDefinition>,
}

impl AlgorithmDefinition {
    pub fn hyperparameter(&self, key: &str) -> Option<&HyperparameterDefinition> {
        self.hyperparameters.iter().find(|def| def.key == key)
    }
}
