//! Hyperparameter tuning job form.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use super::training_definition::{TrainingJobDefinition, TuningObjective};
use super::FormDefinition;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::document::Document;
use crate::domain::models::path::Path;
use crate::domain::models::wizard::WizardStep;
use crate::domain::ports::{AlgorithmCatalog, CompositeValidator, SchemaValidator};
use crate::infrastructure::validators::JsonSchemaValidator;
use crate::services::range_validator::{DefinitionLocator, HyperparameterRulesValidator};

const SCHEMA: &str = include_str!("../../data/hpo_job.schema.json");

pub const TRAINING_JOB_DEFINITIONS: &str = "TrainingJobDefinitions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceLimits {
    pub max_number_of_training_jobs: u32,
    pub max_parallel_training_jobs: u32,
    #[serde(default)]
    pub max_runtime_in_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TuningJobConfig {
    pub strategy: String,
    #[serde(default)]
    pub training_job_early_stopping_type: Option<String>,
    #[serde(default)]
    pub hyper_parameter_tuning_job_objective: Option<TuningObjective>,
    pub resource_limits: ResourceLimits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Typed `CreateHyperParameterTuningJob` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HpoJobRequest {
    pub hyper_parameter_tuning_job_name: String,
    pub hyper_parameter_tuning_job_config: TuningJobConfig,
    pub training_job_definitions: Vec<TrainingJobDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// Three-step wizard creating a tuning job with one or more definitions.
pub struct HpoJobForm {
    validator: CompositeValidator,
}

impl HpoJobForm {
    pub fn new(catalog: Arc<dyn AlgorithmCatalog>) -> Result<Self> {
        let schema = JsonSchemaValidator::from_str(SCHEMA)?;
        let rules = HyperparameterRulesValidator::new(
            catalog,
            DefinitionLocator::Each(Path::root().field(TRAINING_JOB_DEFINITIONS)),
        );
        Ok(Self {
            validator: CompositeValidator::new()
                .with(Arc::new(schema))
                .with(Arc::new(rules)),
        })
    }

    /// Path of the definition stored in slot `index`.
    pub fn definition_path(index: usize) -> Path {
        Path::root().field(TRAINING_JOB_DEFINITIONS).index(index)
    }
}

fn config_field(name: &str) -> Path {
    Path::root().field("HyperParameterTuningJobConfig").field(name)
}

impl FormDefinition for HpoJobForm {
    fn name(&self) -> &str {
        "hpo_job"
    }

    fn steps(&self) -> Vec<WizardStep> {
        vec![
            WizardStep::new(
                "Tuning job settings",
                vec![
                    Path::root().field("HyperParameterTuningJobName"),
                    config_field("Strategy"),
                    config_field("TrainingJobEarlyStoppingType"),
                ],
            ),
            WizardStep::new(
                "Training job definitions",
                vec![Path::root().field(TRAINING_JOB_DEFINITIONS)],
            ),
            WizardStep::new("Resource limits", vec![config_field("ResourceLimits")]),
        ]
    }

    fn initial_document(&self) -> Document {
        json!({
            "HyperParameterTuningJobName": "",
            "HyperParameterTuningJobConfig": {
                "Strategy": "Bayesian",
                "TrainingJobEarlyStoppingType": "Off",
                "ResourceLimits": {}
            },
            "TrainingJobDefinitions": []
        })
        .into()
    }

    fn validator(&self) -> &dyn SchemaValidator {
        &self.validator
    }

    fn prepare_submission(&self, doc: &Document) -> DomainResult<Value> {
        let payload = doc.compacted().to_json();
        serde_json::from_value::<HpoJobRequest>(payload.clone())
            .map_err(|e| DomainError::Submission(e.to_string()))?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::catalog::YamlCatalog;

    fn form() -> HpoJobForm {
        HpoJobForm::new(Arc::new(YamlCatalog::builtin().unwrap())).unwrap()
    }

    #[test]
    fn test_steps_cover_expected_prefixes() {
        let steps = form().steps();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].fields, vec![Path::parse("TrainingJobDefinitions").unwrap()]);
        assert_eq!(
            steps[2].fields,
            vec![Path::parse("HyperParameterTuningJobConfig.ResourceLimits").unwrap()]
        );
    }

    #[test]
    fn test_initial_document_issues() {
        let form = form();
        let issues = form.validator().validate(&form.initial_document()).unwrap_err();
        let paths: Vec<String> = issues.iter().map(|i| i.path.to_string()).collect();
        assert!(paths.contains(&"HyperParameterTuningJobName".to_string()));
        assert!(paths.contains(&"TrainingJobDefinitions".to_string()));
        assert!(paths.contains(
            &"HyperParameterTuningJobConfig.ResourceLimits.MaxNumberOfTrainingJobs".to_string()
        ));
    }

    #[test]
    fn test_prepare_submission_compacts_definitions() {
        let doc: Document = json!({
            "HyperParameterTuningJobName": "job-1",
            "HyperParameterTuningJobConfig": {
                "Strategy": "Random",
                "ResourceLimits": {"MaxNumberOfTrainingJobs": 10, "MaxParallelTrainingJobs": 2}
            },
            "TrainingJobDefinitions": [
                {"DefinitionName": "TrainingJobDefinition-1", "StaticHyperParameters": {"num_round": "10"}},
                {"DefinitionName": "TrainingJobDefinition-2"}
            ]
        })
        .into();
        let mut batch = crate::services::mutation_reducer::MutationBatch::new();
        batch.unset(HpoJobForm::definition_path(0));
        let doc = crate::services::mutation_reducer::MutationReducer::new()
            .apply(&doc, &batch)
            .unwrap();

        let payload = form().prepare_submission(&doc).unwrap();
        assert_eq!(
            payload["TrainingJobDefinitions"],
            json!([{"DefinitionName": "TrainingJobDefinition-2"}])
        );
        let typed: HpoJobRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(typed.hyper_parameter_tuning_job_config.resource_limits.max_parallel_training_jobs, 2);
    }
}
