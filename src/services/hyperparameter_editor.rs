//! Hyperparameter editing on top of a form session.
//!
//! Each call reads the typed parameter from the session document, lets
//! [`HyperparameterService`] build the batch, and applies it as one session
//! update. Touched marks of removed wire entries are dropped in the same step.

use std::sync::Arc;
use tracing::info;

use super::form_session::FormSession;
use super::hyperparameter_service::{HyperparameterService, WireContainers};
use super::mutation_reducer::MutationBatch;
use super::path_accessor::PathAccessor;
use crate::domain::errors::{DomainResult, HyperparameterError};
use crate::domain::models::catalog::{AlgorithmDefinition, ObjectiveMetric};
use crate::domain::models::document::Document;
use crate::domain::models::hyperparameter::{Hyperparameter, HyperparameterType, HyperparameterValue};
use crate::domain::models::path::Path;
use crate::domain::ports::AlgorithmCatalog;

/// Edits the hyperparameters of one training definition.
pub struct HyperparameterEditor {
    catalog: Arc<dyn AlgorithmCatalog>,
    containers: WireContainers,
    service: HyperparameterService,
    accessor: PathAccessor,
}

impl std::fmt::Debug for HyperparameterEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperparameterEditor")
            .field("containers", &self.containers)
            .finish_non_exhaustive()
    }
}

impl HyperparameterEditor {
    /// Editor for the definition rooted at `base`.
    pub fn new(catalog: Arc<dyn AlgorithmCatalog>, base: Path) -> Self {
        Self {
            catalog,
            containers: WireContainers::at(base),
            service: HyperparameterService::new(),
            accessor: PathAccessor::new(),
        }
    }

    pub fn containers(&self) -> &WireContainers {
        &self.containers
    }

    fn algorithm_name_path(&self) -> Path {
        self.containers
            .base()
            .clone()
            .field("AlgorithmSpecification")
            .field("AlgorithmName")
    }

    /// Catalog entry of the definition's selected algorithm.
    pub fn algorithm(&self, doc: &Document) -> Option<&AlgorithmDefinition> {
        self.accessor
            .get(doc, &self.algorithm_name_path())
            .and_then(Document::as_str)
            .and_then(|name| self.catalog.algorithm(name))
    }

    /// Objective metrics offered for the selected algorithm.
    pub fn objective_metrics(&self, doc: &Document) -> &[ObjectiveMetric] {
        self.algorithm(doc)
            .map(|algorithm| algorithm.metadata.objective_metrics.as_slice())
            .unwrap_or_default()
    }

    pub fn parameters(&self, session: &FormSession) -> Vec<Hyperparameter> {
        let doc = session.document();
        self.service
            .read_all(doc, &self.containers, self.algorithm(doc))
    }

    pub fn parameter(&self, session: &FormSession, key: &str) -> DomainResult<Hyperparameter> {
        let doc = session.document();
        self.service
            .read(doc, &self.containers, self.algorithm(doc), key)
    }

    /// Select an algorithm and reseed every container with its defaults.
    pub fn select_algorithm(&self, session: &mut FormSession, name: &str) -> DomainResult<()> {
        let algorithm = self
            .catalog
            .algorithm(name)
            .ok_or_else(|| HyperparameterError::UnknownAlgorithm(name.to_string()))?;

        let mut batch = MutationBatch::new();
        batch
            .set(self.algorithm_name_path(), name)
            .unset(self.containers.static_map())
            .unset(self.containers.ranges());
        if let Some(image) = &algorithm.training_image {
            batch.set(
                self.containers
                    .base()
                    .clone()
                    .field("AlgorithmSpecification")
                    .field("TrainingImage"),
                image.as_str(),
            );
        }
        batch.extend(self.service.seed(&self.containers, algorithm));

        session.apply_and_untouch_removed(&batch)?;
        info!(
            session_id = %session.id(),
            algorithm = name,
            hyperparameters = algorithm.hyperparameters.len(),
            "algorithm selected"
        );
        Ok(())
    }

    pub fn change_type(
        &self,
        session: &mut FormSession,
        key: &str,
        new_type: HyperparameterType,
    ) -> DomainResult<Hyperparameter> {
        let hp = self.parameter(session, key)?;
        let (updated, batch) =
            self.service
                .change_type(session.document(), &self.containers, &hp, new_type)?;
        session.apply_and_untouch_removed(&batch)?;
        Ok(updated)
    }

    pub fn rename(&self, session: &mut FormSession, key: &str, new_key: &str) -> DomainResult<Hyperparameter> {
        let hp = self.parameter(session, key)?;
        let (renamed, batch) = self
            .service
            .rename(session.document(), &self.containers, &hp, new_key)?;
        session.apply_and_untouch_removed(&batch)?;
        Ok(renamed)
    }

    pub fn update_value(
        &self,
        session: &mut FormSession,
        key: &str,
        value: HyperparameterValue,
    ) -> DomainResult<Hyperparameter> {
        let hp = self.parameter(session, key)?;
        let (updated, batch) = self
            .service
            .update_value(session.document(), &self.containers, &hp, value)?;
        session.apply_and_untouch_removed(&batch)?;
        Ok(updated)
    }

    /// Add a parameter that is not yet present.
    pub fn add(&self, session: &mut FormSession, hp: &Hyperparameter) -> DomainResult<()> {
        let batch = self.service.insert(session.document(), &self.containers, hp)?;
        session.apply(&batch)
    }

    pub fn remove(&self, session: &mut FormSession, key: &str) -> DomainResult<()> {
        let hp = self.parameter(session, key)?;
        let batch = self.service.remove(session.document(), &self.containers, &hp)?;
        session.apply_and_untouch_removed(&batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;
    use crate::forms::TrainingDefinitionForm;
    use crate::infrastructure::catalog::YamlCatalog;

    fn setup() -> (HyperparameterEditor, FormSession) {
        let catalog: Arc<dyn AlgorithmCatalog> = Arc::new(YamlCatalog::builtin().unwrap());
        let form = TrainingDefinitionForm::new(catalog.clone()).unwrap();
        let session = FormSession::new(Arc::new(form));
        (HyperparameterEditor::new(catalog, Path::root()), session)
    }

    #[test]
    fn test_select_algorithm_seeds_containers() {
        let (editor, mut session) = setup();
        editor.select_algorithm(&mut session, "xgboost").unwrap();

        let params = editor.parameters(&session);
        let keys: Vec<&str> = params.iter().map(|hp| hp.key.as_str()).collect();
        assert!(keys.contains(&"num_round"));
        assert!(keys.contains(&"max_depth"));

        let max_depth = editor.parameter(&session, "max_depth").unwrap();
        assert_eq!(max_depth.kind(), HyperparameterType::Integer);
        assert!(!max_depth.type_options.is_empty());
        assert!(!editor.objective_metrics(session.document()).is_empty());
    }

    #[test]
    fn test_unknown_algorithm() {
        let (editor, mut session) = setup();
        assert!(matches!(
            editor.select_algorithm(&mut session, "deepar"),
            Err(DomainError::Hyperparameter(HyperparameterError::UnknownAlgorithm(_)))
        ));
    }

    #[test]
    fn test_reselect_clears_touched_hyperparameters() {
        let (editor, mut session) = setup();
        editor.select_algorithm(&mut session, "xgboost").unwrap();
        let touched = Path::parse("HyperParameterRanges.IntegerParameterRanges[0].MinValue").unwrap();
        session.touch_fields(&[touched.clone()]).unwrap();
        editor.select_algorithm(&mut session, "linear-learner").unwrap();
        assert!(!session.touched().is_touched(&touched));
        assert!(editor.parameter(&session, "max_depth").is_err());
    }

    #[test]
    fn test_change_type_respects_catalog_options() {
        let (editor, mut session) = setup();
        editor.select_algorithm(&mut session, "xgboost").unwrap();
        // eta may only be static or continuous
        assert!(editor
            .change_type(&mut session, "eta", HyperparameterType::Categorical)
            .is_err());
        let updated = editor
            .change_type(&mut session, "eta", HyperparameterType::Static)
            .unwrap();
        assert_eq!(updated.value, HyperparameterValue::Static { value: "0.1".into() });
    }

    #[test]
    fn test_add_rename_remove() {
        let (editor, mut session) = setup();
        editor.select_algorithm(&mut session, "xgboost").unwrap();
        let hp = Hyperparameter::new("gamma", HyperparameterValue::Static { value: "0".into() });
        editor.add(&mut session, &hp).unwrap();
        assert!(editor.add(&mut session, &hp).is_err());

        editor.rename(&mut session, "gamma", "min_split_loss").unwrap();
        assert!(editor.parameter(&session, "gamma").is_err());
        editor.remove(&mut session, "min_split_loss").unwrap();
        assert!(editor.parameter(&session, "min_split_loss").is_err());
    }
}
