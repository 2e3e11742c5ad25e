//! Wizard step model.
//!
//! A wizard is an ordered list of steps, each owning a set of field-group
//! prefixes. Forward navigation is gated on those prefixes being free of
//! errors; backward navigation never is.

use serde::{Deserialize, Serialize};

use super::path::Path;
use crate::domain::errors::{DomainError, DomainResult};

/// One page of a multi-step form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardStep {
    pub title: String,
    /// Field-group prefixes validated before leaving this step.
    pub fields: Vec<Path>,
}

impl WizardStep {
    pub fn new(title: impl Into<String>, fields: Vec<Path>) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }
}

/// Lifecycle of a wizard session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStatus {
    /// User is editing one of the steps
    #[default]
    Active,
    /// Final submit accepted
    Submitted,
    /// Session discarded
    Cancelled,
}

impl WizardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Submitted => "submitted",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted | Self::Cancelled)
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(&self) -> Vec<WizardStatus> {
        match self {
            Self::Active => vec![Self::Submitted, Self::Cancelled],
            Self::Submitted | Self::Cancelled => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// Outcome of a forward navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepTransition {
    Advanced { from: usize, to: usize },
    Blocked { step: usize },
}

/// Navigation state of one wizard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wizard {
    steps: Vec<WizardStep>,
    current_step: usize,
    furthest_step: usize,
    validate_all: bool,
    status: WizardStatus,
}

impl Wizard {
    /// A wizard over `steps`; an empty list becomes a single ungated step.
    pub fn new(steps: Vec<WizardStep>) -> Self {
        let steps = if steps.is_empty() {
            vec![WizardStep::new("Form", Vec::new())]
        } else {
            steps
        };
        Self {
            steps,
            current_step: 0,
            furthest_step: 0,
            validate_all: false,
            status: WizardStatus::Active,
        }
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn current(&self) -> &WizardStep {
        &self.steps[self.current_step]
    }

    pub fn furthest_step(&self) -> usize {
        self.furthest_step
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 == self.steps.len()
    }

    pub fn validate_all(&self) -> bool {
        self.validate_all
    }

    pub fn set_validate_all(&mut self, validate_all: bool) {
        self.validate_all = validate_all;
    }

    pub fn status(&self) -> WizardStatus {
        self.status
    }

    pub fn ensure_active(&self) -> DomainResult<()> {
        if self.status == WizardStatus::Active {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: WizardStatus::Active.as_str().to_string(),
                reason: "wizard is no longer active".to_string(),
            })
        }
    }

    /// Apply the gate decision for `next`.
    ///
    /// Blocked: stay put and switch to validate-all so every error shows.
    /// Allowed: move forward and drop back to touched-only validation.
    pub fn advance(&mut self, permitted: bool) -> DomainResult<StepTransition> {
        self.ensure_active()?;
        if self.is_last_step() {
            return Err(DomainError::InvalidTransition {
                from: format!("step {}", self.current_step),
                to: format!("step {}", self.current_step + 1),
                reason: "already on the last step; submit instead".to_string(),
            });
        }

        if !permitted {
            self.validate_all = true;
            return Ok(StepTransition::Blocked {
                step: self.current_step,
            });
        }

        let from = self.current_step;
        self.current_step += 1;
        self.furthest_step = self.furthest_step.max(self.current_step);
        self.validate_all = false;
        Ok(StepTransition::Advanced {
            from,
            to: self.current_step,
        })
    }

    pub fn previous(&mut self) -> DomainResult<usize> {
        self.ensure_active()?;
        self.current_step = self.current_step.saturating_sub(1);
        Ok(self.current_step)
    }

    /// Jump to any step already reached.
    pub fn jump(&mut self, step: usize) -> DomainResult<usize> {
        self.ensure_active()?;
        if step > self.furthest_step || step >= self.steps.len() {
            return Err(DomainError::InvalidStep {
                requested: step,
                furthest: self.furthest_step,
            });
        }
        self.current_step = step;
        Ok(step)
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        self.transition(WizardStatus::Cancelled)
    }

    pub fn mark_submitted(&mut self) -> DomainResult<()> {
        if !self.is_last_step() {
            return Err(DomainError::InvalidTransition {
                from: format!("step {}", self.current_step),
                to: WizardStatus::Submitted.as_str().to_string(),
                reason: "submit is only available on the last step".to_string(),
            });
        }
        self.transition(WizardStatus::Submitted)
    }

    fn transition(&mut self, to: WizardStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(to) {
            return Err(DomainError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: "transition not allowed".to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_steps() -> Wizard {
        Wizard::new(vec![
            WizardStep::new("One", vec![Path::root().field("A")]),
            WizardStep::new("Two", vec![Path::root().field("B")]),
            WizardStep::new("Three", vec![Path::root().field("C")]),
        ])
    }

    #[test]
    fn test_blocked_advance_forces_validate_all() {
        let mut wizard = three_steps();
        let outcome = wizard.advance(false).unwrap();
        assert_eq!(outcome, StepTransition::Blocked { step: 0 });
        assert!(wizard.validate_all());
        assert_eq!(wizard.current_step(), 0);
    }

    #[test]
    fn test_advance_resets_validate_all() {
        let mut wizard = three_steps();
        wizard.set_validate_all(true);
        let outcome = wizard.advance(true).unwrap();
        assert_eq!(outcome, StepTransition::Advanced { from: 0, to: 1 });
        assert!(!wizard.validate_all());
        assert_eq!(wizard.furthest_step(), 1);
    }

    #[test]
    fn test_jump_only_to_reached_steps() {
        let mut wizard = three_steps();
        wizard.advance(true).unwrap();
        wizard.advance(true).unwrap();
        assert_eq!(wizard.jump(0).unwrap(), 0);
        assert_eq!(wizard.jump(2).unwrap(), 2);

        let mut fresh = three_steps();
        assert!(matches!(
            fresh.jump(1),
            Err(DomainError::InvalidStep { requested: 1, furthest: 0 })
        ));
    }

    #[test]
    fn test_previous_saturates_at_zero() {
        let mut wizard = three_steps();
        assert_eq!(wizard.previous().unwrap(), 0);
    }

    #[test]
    fn test_submit_only_on_last_step() {
        let mut wizard = three_steps();
        assert!(wizard.mark_submitted().is_err());
        wizard.advance(true).unwrap();
        wizard.advance(true).unwrap();
        wizard.mark_submitted().unwrap();
        assert_eq!(wizard.status(), WizardStatus::Submitted);
        assert!(wizard.advance(true).is_err());
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut wizard = three_steps();
        wizard.cancel().unwrap();
        assert!(wizard.status().is_terminal());
        assert!(wizard.cancel().is_err());
        assert!(wizard.previous().is_err());
    }

    #[test]
    fn test_empty_steps_become_single_step() {
        let wizard = Wizard::new(Vec::new());
        assert_eq!(wizard.steps().len(), 1);
        assert!(wizard.is_last_step());
    }
}
