//! Per-wizard form state.
//!
//! A session owns one document, its touched tree and the wizard position.
//! Every instance is independent; nothing is shared between sessions except
//! the read-only form definition.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::mutation_reducer::{FieldMap, MutationBatch, MutationMethod, MutationReducer};
use super::step_gate::WizardStepGate;
use super::touch_tracker::TouchTracker;
use super::validation_engine::ValidationEngine;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::document::Document;
use crate::domain::models::issue::ErrorTree;
use crate::domain::models::path::Path;
use crate::domain::models::wizard::{StepTransition, Wizard};
use crate::forms::FormDefinition;

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "body", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Payload ready for the backend
    Submitted(Value),
    /// Document still has errors; the session stays open in validate-all mode
    Rejected(ErrorTree),
}

/// State of one open wizard.
pub struct FormSession {
    id: Uuid,
    definition: Arc<dyn FormDefinition>,
    document: Document,
    touched: TouchTracker,
    wizard: Wizard,
    reducer: MutationReducer,
    engine: ValidationEngine,
    gate: WizardStepGate,
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("id", &self.id)
            .field("form", &self.definition.name())
            .field("wizard", &self.wizard)
            .finish_non_exhaustive()
    }
}

impl FormSession {
    pub fn new(definition: Arc<dyn FormDefinition>) -> Self {
        Self::with_engine(definition, ValidationEngine::new())
    }

    pub fn with_engine(definition: Arc<dyn FormDefinition>, engine: ValidationEngine) -> Self {
        let id = Uuid::new_v4();
        let document = definition.initial_document();
        let wizard = Wizard::new(definition.steps());
        info!(session_id = %id, form = definition.name(), steps = wizard.steps().len(), "form session opened");
        Self {
            id,
            definition,
            document,
            touched: TouchTracker::new(),
            wizard,
            reducer: MutationReducer::new(),
            engine,
            gate: WizardStepGate::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn definition(&self) -> &dyn FormDefinition {
        self.definition.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn touched(&self) -> &TouchTracker {
        &self.touched
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    fn ensure_open(&self) -> DomainResult<()> {
        if self.wizard.status().is_terminal() {
            warn!(session_id = %self.id, status = self.wizard.status().as_str(), "operation on closed session");
            return Err(DomainError::SessionClosed(self.id.to_string()));
        }
        Ok(())
    }

    /// Apply one batch atomically.
    pub fn apply(&mut self, batch: &MutationBatch) -> DomainResult<()> {
        self.ensure_open()?;
        self.document = self.reducer.apply(&self.document, batch)?;
        debug!(session_id = %self.id, operations = batch.len(), "document updated");
        Ok(())
    }

    /// `setFields(pathValueMap, method)`.
    pub fn set_fields(&mut self, fields: FieldMap, method: MutationMethod) -> DomainResult<()> {
        self.apply(&MutationBatch::from_fields(fields, method))
    }

    /// Apply a batch and clear the touched state of every path it unsets.
    ///
    /// Used when a wire entry is removed so a later entry landing in the
    /// same slot does not inherit its touched marks.
    pub fn apply_and_untouch_removed(&mut self, batch: &MutationBatch) -> DomainResult<()> {
        self.ensure_open()?;
        let next = self.reducer.apply(&self.document, batch)?;
        let mut touched = self.touched.clone();
        touched.untouch(batch.unset_paths())?;
        self.document = next;
        self.touched = touched;
        debug!(session_id = %self.id, operations = batch.len(), "document updated");
        Ok(())
    }

    pub fn touch_fields(&mut self, paths: &[Path]) -> DomainResult<()> {
        self.ensure_open()?;
        self.touched.touch(paths)?;
        debug!(session_id = %self.id, paths = paths.len(), "fields touched");
        Ok(())
    }

    pub fn untouch(&mut self, paths: &[Path]) -> DomainResult<()> {
        self.ensure_open()?;
        self.touched.untouch(paths)?;
        Ok(())
    }

    /// Errors to display: touched-only unless the wizard is in validate-all.
    pub fn errors(&self) -> ErrorTree {
        self.engine.validate(
            &self.document,
            self.definition.validator(),
            &self.touched,
            self.wizard.validate_all(),
        )
    }

    /// Every error, regardless of touched state.
    pub fn full_errors(&self) -> ErrorTree {
        self.engine
            .validate(&self.document, self.definition.validator(), &self.touched, true)
    }

    /// Whether `next` would leave the current step.
    pub fn can_advance(&self) -> bool {
        self.gate
            .can_advance(&self.full_errors(), &self.wizard.current().fields)
    }

    /// Gated forward navigation.
    pub fn next(&mut self) -> DomainResult<StepTransition> {
        self.ensure_open()?;
        let permitted = self.can_advance();
        let transition = self.wizard.advance(permitted)?;
        match transition {
            StepTransition::Advanced { from, to } => {
                debug!(session_id = %self.id, from, to, "step advanced");
            }
            StepTransition::Blocked { step } => {
                debug!(session_id = %self.id, step, "step blocked, showing all errors");
            }
        }
        Ok(transition)
    }

    pub fn previous(&mut self) -> DomainResult<usize> {
        self.ensure_open()?;
        self.wizard.previous()
    }

    pub fn jump(&mut self, step: usize) -> DomainResult<usize> {
        self.ensure_open()?;
        self.wizard.jump(step)
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        self.ensure_open()?;
        self.wizard.cancel()?;
        info!(session_id = %self.id, "form session cancelled");
        Ok(())
    }

    /// Validate everything and, if clean, build the payload.
    pub fn submit(&mut self) -> DomainResult<SubmitOutcome> {
        self.ensure_open()?;
        if !self.wizard.is_last_step() {
            return Err(DomainError::InvalidTransition {
                from: format!("step {}", self.wizard.current_step()),
                to: "submitted".to_string(),
                reason: "submit is only available on the last step".to_string(),
            });
        }

        self.wizard.set_validate_all(true);
        let errors = self.full_errors();
        if !errors.is_empty() {
            info!(session_id = %self.id, errors = errors.len(), "submission rejected");
            return Ok(SubmitOutcome::Rejected(errors));
        }

        let payload = self.definition.prepare_submission(&self.document)?;
        self.wizard.mark_submitted()?;
        info!(session_id = %self.id, form = self.definition.name(), "form submitted");
        Ok(SubmitOutcome::Submitted(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::issue::Issue;
    use crate::domain::models::wizard::{WizardStatus, WizardStep};
    use crate::domain::ports::SchemaValidator;
    use serde_json::json;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    /// Two steps: `name` must be non-empty, `size` must be set.
    struct TwoStepForm;

    fn two_step_rules(doc: &Document) -> Result<(), Vec<Issue>> {
        let json = doc.to_json();
        let mut issues = Vec::new();
        if json["name"].as_str().map_or(true, str::is_empty) {
            issues.push(Issue::new(p("name"), "Required"));
        }
        if json["size"].is_null() {
            issues.push(Issue::new(p("size"), "Required"));
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    impl FormDefinition for TwoStepForm {
        fn name(&self) -> &str {
            "two_step"
        }

        fn steps(&self) -> Vec<WizardStep> {
            vec![
                WizardStep::new("Name", vec![p("name")]),
                WizardStep::new("Size", vec![p("size")]),
            ]
        }

        fn initial_document(&self) -> Document {
            json!({"name": ""}).into()
        }

        fn validator(&self) -> &dyn SchemaValidator {
            &two_step_rules
        }

        fn prepare_submission(&self, doc: &Document) -> DomainResult<Value> {
            Ok(doc.compacted().to_json())
        }
    }

    fn session() -> FormSession {
        FormSession::new(Arc::new(TwoStepForm))
    }

    fn set(session: &mut FormSession, path: &str, value: Value) {
        let mut fields = FieldMap::new();
        fields.insert(p(path), value.into());
        session.set_fields(fields, MutationMethod::Set).unwrap();
    }

    #[test]
    fn test_errors_hidden_until_touched() {
        let mut session = session();
        assert!(session.errors().is_empty());
        assert_eq!(session.full_errors().len(), 2);
        session.touch_fields(&[p("name")]).unwrap();
        assert_eq!(session.errors().get(&p("name")), Some("Required"));
        assert!(session.errors().get(&p("size")).is_none());
    }

    #[test]
    fn test_blocked_next_switches_to_validate_all() {
        let mut session = session();
        let transition = session.next().unwrap();
        assert_eq!(transition, StepTransition::Blocked { step: 0 });
        assert!(session.wizard().validate_all());
        assert_eq!(session.errors().len(), 2);
    }

    #[test]
    fn test_next_after_fix_advances_and_resets_validate_all() {
        let mut session = session();
        session.next().unwrap();
        set(&mut session, "name", json!("job"));
        let transition = session.next().unwrap();
        assert_eq!(transition, StepTransition::Advanced { from: 0, to: 1 });
        assert!(!session.wizard().validate_all());
        assert!(session.errors().is_empty());
    }

    #[test]
    fn test_submit_rejected_then_accepted() {
        let mut session = session();
        set(&mut session, "name", json!("job"));
        session.next().unwrap();

        let outcome = session.submit().unwrap();
        match outcome {
            SubmitOutcome::Rejected(errors) => assert_eq!(errors.get(&p("size")), Some("Required")),
            SubmitOutcome::Submitted(_) => panic!("expected rejection"),
        }
        assert_eq!(session.wizard().status(), WizardStatus::Active);

        set(&mut session, "size", json!(3));
        let outcome = session.submit().unwrap();
        assert_eq!(outcome, SubmitOutcome::Submitted(json!({"name": "job", "size": 3})));
        assert_eq!(session.wizard().status(), WizardStatus::Submitted);
    }

    #[test]
    fn test_submit_before_last_step_is_error() {
        let mut session = session();
        assert!(matches!(
            session.submit(),
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancelled_session_rejects_mutations() {
        let mut session = session();
        session.cancel().unwrap();
        let mut fields = FieldMap::new();
        fields.insert(p("name"), "x".into());
        assert!(matches!(
            session.set_fields(fields, MutationMethod::Set),
            Err(DomainError::SessionClosed(_))
        ));
        assert!(matches!(session.next(), Err(DomainError::SessionClosed(_))));
    }

    #[test]
    fn test_failed_batch_keeps_document() {
        let mut session = session();
        let before = session.document().clone();
        let mut batch = MutationBatch::new();
        batch.set(p("size"), 1i64).set(p("name.inner"), 2i64);
        assert!(session.apply(&batch).is_err());
        assert_eq!(session.document(), &before);
    }

    #[test]
    fn test_apply_and_untouch_removed_clears_slot() {
        let mut session = session();
        set(&mut session, "rows", json!([{"v": 1}]));
        session.touch_fields(&[p("rows[0].v")]).unwrap();
        let mut batch = MutationBatch::new();
        batch.unset(p("rows[0]"));
        session.apply_and_untouch_removed(&batch).unwrap();
        assert!(!session.touched().is_touched(&p("rows[0]")));
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = session();
        let b = session();
        set(&mut a, "name", json!("a"));
        assert_ne!(a.id(), b.id());
        assert_eq!(b.document().to_json(), json!({"name": ""}));
    }
}
