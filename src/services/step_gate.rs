//! Step gating for multi-step wizards.
//!
//! A step may be left only when none of its field groups has an issue in the
//! full (validate-all) error tree.

use crate::domain::models::issue::ErrorTree;
use crate::domain::models::path::Path;

/// Decides whether a wizard may leave its current step.
#[derive(Debug, Clone, Copy, Default)]
pub struct WizardStepGate;

impl WizardStepGate {
    pub fn new() -> Self {
        Self
    }

    /// True iff no prefix has an error at or below it.
    ///
    /// Prefixes are usually top-level field groups (`TrainingJobDefinitions`)
    /// but may be deeper (`HyperParameterTuningJobConfig.ResourceLimits`).
    pub fn can_advance(&self, errors: &ErrorTree, prefixes: &[Path]) -> bool {
        !prefixes.iter().any(|prefix| errors.contains_under(prefix))
    }

    /// The prefixes that are blocking, for display.
    pub fn blocking<'a>(&self, errors: &ErrorTree, prefixes: &'a [Path]) -> Vec<&'a Path> {
        prefixes
            .iter()
            .filter(|prefix| errors.contains_under(prefix))
            .collect()
    }
}
