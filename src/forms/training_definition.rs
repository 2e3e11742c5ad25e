//! Training job definition form.
//!
//! One definition of a tuning job, edited in its own nested wizard and then
//! written back into `TrainingJobDefinitions[i]` of the parent form.

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::FormDefinition;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::catalog::ObjectiveType;
use crate::domain::models::document::{Document, Record};
use crate::domain::models::hyperparameter::{
    ScalingType, CATEGORICAL_PARAMETER_RANGES, CONTINUOUS_PARAMETER_RANGES, HYPER_PARAMETER_RANGES,
    INTEGER_PARAMETER_RANGES, STATIC_HYPER_PARAMETERS,
};
use crate::domain::models::path::Path;
use crate::domain::models::wizard::WizardStep;
use crate::domain::ports::{AlgorithmCatalog, CompositeValidator, SchemaValidator};
use crate::infrastructure::validators::JsonSchemaValidator;
use crate::services::range_validator::{DefinitionLocator, HyperparameterRulesValidator};

const SCHEMA: &str = include_str!("../../data/training_definition.schema.json");

/// Prefix of generated definition names.
pub const DEFINITION_NAME_PREFIX: &str = "TrainingJobDefinition";

/// Skeleton definition added to a tuning job before its wizard is opened.
///
/// Carries the name and empty hyperparameter containers plus the resource
/// defaults the console pre-fills.
pub fn placeholder_definition(name: &str) -> Document {
    let mut ranges = Record::new();
    for container in [
        INTEGER_PARAMETER_RANGES,
        CONTINUOUS_PARAMETER_RANGES,
        CATEGORICAL_PARAMETER_RANGES,
    ] {
        ranges.insert(container.to_string(), Document::seq());
    }

    let json = serde_json::json!({
        "DefinitionName": name,
        "AlgorithmSpecification": { "TrainingInputMode": "File" },
        "ResourceConfig": { "InstanceCount": 1, "VolumeSizeInGB": 10 },
        "StoppingCondition": { "MaxRuntimeInSeconds": 86400 },
    });
    let mut doc = Document::from(json);
    if let Document::Record(record) = &mut doc {
        record.insert(STATIC_HYPER_PARAMETERS.to_string(), Document::record());
        record.insert(HYPER_PARAMETER_RANGES.to_string(), Document::Record(ranges));
        record.insert("InputDataConfig".to_string(), Document::seq());
    }
    doc
}

/// First `TrainingJobDefinition-N` not already used by a present item.
pub fn next_definition_name(definitions: &Document) -> String {
    let taken: Vec<&str> = definitions
        .items()
        .filter_map(|item| item.as_record()?.get("DefinitionName")?.as_str())
        .collect();
    (1..)
        .map(|n| format!("{DEFINITION_NAME_PREFIX}-{n}"))
        .find(|name| !taken.contains(&name.as_str()))
        .unwrap_or_else(|| DEFINITION_NAME_PREFIX.to_string())
}

/// Objective of a single definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TuningObjective {
    #[serde(rename = "Type")]
    pub kind: ObjectiveType,
    pub metric_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NumericParameterRange {
    pub name: String,
    pub min_value: String,
    pub max_value: String,
    #[serde(default)]
    pub scaling_type: Option<ScalingType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoricalParameterRange {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterRanges {
    #[serde(default)]
    pub integer_parameter_ranges: Vec<NumericParameterRange>,
    #[serde(default)]
    pub continuous_parameter_ranges: Vec<NumericParameterRange>,
    #[serde(default)]
    pub categorical_parameter_ranges: Vec<CategoricalParameterRange>,
}

/// Typed view of one definition in a submission payload.
///
/// Only the fields the engine knows about are typed; nested blocks the
/// service owns (data sources, resources) stay as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrainingJobDefinition {
    pub definition_name: String,
    #[serde(default)]
    pub algorithm_specification: Option<Value>,
    #[serde(default)]
    pub role_arn: Option<String>,
    #[serde(default)]
    pub tuning_objective: Option<TuningObjective>,
    #[serde(default)]
    pub static_hyper_parameters: IndexMap<String, String>,
    #[serde(default)]
    pub hyper_parameter_ranges: ParameterRanges,
    #[serde(default)]
    pub input_data_config: Vec<Value>,
    #[serde(default)]
    pub output_data_config: Option<Value>,
    #[serde(default)]
    pub resource_config: Option<Value>,
    #[serde(default)]
    pub stopping_condition: Option<Value>,
}

/// Nested wizard for one training job definition.
pub struct TrainingDefinitionForm {
    validator: CompositeValidator,
}

impl TrainingDefinitionForm {
    pub fn new(catalog: Arc<dyn AlgorithmCatalog>) -> Result<Self> {
        let schema = JsonSchemaValidator::from_str(SCHEMA)?;
        let rules = HyperparameterRulesValidator::new(catalog, DefinitionLocator::Single(Path::root()));
        Ok(Self {
            validator: CompositeValidator::new()
                .with(Arc::new(schema))
                .with(Arc::new(rules)),
        })
    }
}

fn field(name: &str) -> Path {
    Path::root().field(name)
}

impl FormDefinition for TrainingDefinitionForm {
    fn name(&self) -> &str {
        "training_job_definition"
    }

    fn steps(&self) -> Vec<WizardStep> {
        vec![
            WizardStep::new(
                "Algorithm options",
                vec![
                    field("DefinitionName"),
                    field("AlgorithmSpecification"),
                    field("RoleArn"),
                ],
            ),
            WizardStep::new(
                "Hyperparameter configuration",
                vec![field(STATIC_HYPER_PARAMETERS), field(HYPER_PARAMETER_RANGES)],
            ),
            WizardStep::new(
                "Input and output data",
                vec![field("InputDataConfig"), field("OutputDataConfig")],
            ),
            WizardStep::new(
                "Resource configuration",
                vec![field("ResourceConfig"), field("StoppingCondition")],
            ),
        ]
    }

    fn initial_document(&self) -> Document {
        placeholder_definition(&format!("{DEFINITION_NAME_PREFIX}-1"))
    }

    fn validator(&self) -> &dyn SchemaValidator {
        &self.validator
    }

    fn prepare_submission(&self, doc: &Document) -> DomainResult<Value> {
        let payload = doc.compacted().to_json();
        serde_json::from_value::<TrainingJobDefinition>(payload.clone())
            .map_err(|e| DomainError::Submission(e.to_string()))?;
        Ok(payload)
    }
}
