//! Hyperparameter field validation.
//!
//! [`RangeValidator`] checks one typed hyperparameter against its catalog
//! constraint. [`HyperparameterRulesValidator`] runs it over every training
//! definition of a document and reports the issues at their wire paths, so
//! the result composes with the JSON-schema validator like any other
//! [`SchemaValidator`].

use std::sync::Arc;

use super::hyperparameter_service::{HyperparameterService, WireContainers};
use super::path_accessor::PathAccessor;
use crate::domain::models::catalog::ValueConstraint;
use crate::domain::models::document::Document;
use crate::domain::models::hyperparameter::{
    Bound, Hyperparameter, HyperparameterIssue, HyperparameterType, HyperparameterValue, IssueTarget,
};
use crate::domain::models::issue::Issue;
use crate::domain::models::path::Path;
use crate::domain::ports::{AlgorithmCatalog, FieldValidator, SchemaValidator};

pub const REQUIRED_MESSAGE: &str = "Required";
pub const RANGE_ORDER_MESSAGE: &str = "Minimum value must be less than or equal to maximum value";

/// Checks a single hyperparameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeValidator;

impl RangeValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, hp: &Hyperparameter) -> Vec<HyperparameterIssue> {
        let mut issues = Vec::new();
        let issue = |target: IssueTarget, message: String| HyperparameterIssue {
            key: hp.key.clone(),
            target,
            message,
        };

        match &hp.value {
            HyperparameterValue::Static { value } => {
                if let Some(message) = self.check_optional(hp, value, hp.required) {
                    issues.push(issue(IssueTarget::Parameter, message));
                }
            }
            HyperparameterValue::Integer { min, max, .. }
            | HyperparameterValue::Continuous { min, max, .. } => {
                let min_present = !min.trim().is_empty();
                if let Some(message) = self.check_optional(hp, min, hp.required) {
                    issues.push(issue(
                        IssueTarget::Bound(Bound::Min),
                        format!("{}: {message}", Bound::Min.label()),
                    ));
                }
                // An empty max is only reported once the range has been started.
                if min_present || hp.required {
                    if let Some(message) = self.check_optional(hp, max, true) {
                        issues.push(issue(
                            IssueTarget::Bound(Bound::Max),
                            format!("{}: {message}", Bound::Max.label()),
                        ));
                    }
                }
                if bounds_out_of_order(hp.kind(), min, max) {
                    issues.push(issue(IssueTarget::Parameter, RANGE_ORDER_MESSAGE.to_string()));
                }
            }
            HyperparameterValue::Categorical { values } => {
                if values.is_empty() && hp.required {
                    issues.push(issue(IssueTarget::Parameter, REQUIRED_MESSAGE.to_string()));
                }
                for (i, value) in values.iter().enumerate() {
                    if let Some(message) = self.check_optional(hp, value, true) {
                        issues.push(issue(IssueTarget::Value(i), message));
                    }
                }
            }
        }
        issues
    }

    /// Empty input is absent: an issue only when `required`, otherwise the
    /// constraint is not consulted.
    fn check_optional(&self, hp: &Hyperparameter, value: &str, required: bool) -> Option<String> {
        if value.trim().is_empty() {
            return required.then(|| REQUIRED_MESSAGE.to_string());
        }
        self.constraint_for(hp).and_then(|rule| rule.check(value).err())
    }

    /// The catalog rule, or the numeric rule implied by a range shape.
    fn constraint_for(&self, hp: &Hyperparameter) -> Option<ValueConstraint> {
        match (&hp.constraint, hp.kind()) {
            (Some(rule), _) => Some(rule.clone()),
            (None, HyperparameterType::Integer) => Some(ValueConstraint::Integer { min: None, max: None }),
            (None, HyperparameterType::Continuous) => Some(ValueConstraint::Continuous { min: None, max: None }),
            (None, _) => None,
        }
    }
}

/// True when both bounds parse and `min > max`. Integer ranges compare as
/// integers so large bounds keep their precision.
fn bounds_out_of_order(kind: HyperparameterType, min: &str, max: &str) -> bool {
    let (min, max) = (min.trim(), max.trim());
    match kind {
        HyperparameterType::Integer => match (min.parse::<i128>(), max.parse::<i128>()) {
            (Ok(lo), Ok(hi)) => lo > hi,
            _ => false,
        },
        _ => match (min.parse::<f64>(), max.parse::<f64>()) {
            (Ok(lo), Ok(hi)) => lo > hi,
            _ => false,
        },
    }
}

/// Where the training definitions of a document live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionLocator {
    /// One definition rooted at the given path.
    Single(Path),
    /// Every present item of the sequence at the given path.
    Each(Path),
}

/// Hyperparameter rules for every training definition of a document.
pub struct HyperparameterRulesValidator {
    catalog: Arc<dyn AlgorithmCatalog>,
    locator: DefinitionLocator,
    service: HyperparameterService,
    ranges: RangeValidator,
    accessor: PathAccessor,
}

impl std::fmt::Debug for HyperparameterRulesValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperparameterRulesValidator")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

impl HyperparameterRulesValidator {
    pub fn new(catalog: Arc<dyn AlgorithmCatalog>, locator: DefinitionLocator) -> Self {
        Self {
            catalog,
            locator,
            service: HyperparameterService::new(),
            ranges: RangeValidator::new(),
            accessor: PathAccessor::new(),
        }
    }

    fn bases(&self, doc: &Document) -> Vec<Path> {
        match &self.locator {
            DefinitionLocator::Single(base) => vec![base.clone()],
            DefinitionLocator::Each(list) => self
                .accessor
                .get(doc, list)
                .map(|seq| {
                    seq.indexed_items()
                        .filter(|(_, item)| item.as_record().is_some())
                        .map(|(i, _)| list.clone().index(i))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn validate_definition(&self, doc: &Document, base: &Path, out: &mut Vec<Issue>) {
        let containers = WireContainers::at(base.clone());
        let algorithm = self
            .accessor
            .get(doc, &base.clone().field("AlgorithmSpecification").field("AlgorithmName"))
            .and_then(Document::as_str)
            .and_then(|name| self.catalog.algorithm(name));

        let parameters = self.service.read_all(doc, &containers, algorithm);
        for hp in &parameters {
            let index = self.service.locate_index(doc, &containers, hp);
            let Some(entry) = containers.entry_path(hp.kind(), &hp.key, index) else {
                continue;
            };
            for issue in self.ranges.validate(hp) {
                let path = match (issue.target, hp.kind()) {
                    (IssueTarget::Bound(bound), _) => entry.clone().field(bound.wire_field()),
                    (IssueTarget::Value(i), _) => entry.clone().field("Values").index(i),
                    (IssueTarget::Parameter, HyperparameterType::Categorical) => {
                        entry.clone().field("Values")
                    }
                    (IssueTarget::Parameter, _) => entry.clone(),
                };
                out.push(Issue::new(path, issue.message));
            }
        }

        if let Some(algorithm) = algorithm {
            for def in algorithm.hyperparameters.iter().filter(|def| def.required) {
                if parameters.iter().all(|hp| hp.key != def.key) {
                    out.push(Issue::new(containers.static_entry(&def.key), REQUIRED_MESSAGE));
                }
            }
        }
    }
}

impl SchemaValidator for HyperparameterRulesValidator {
    fn validate(&self, doc: &Document) -> Result<(), Vec<Issue>> {
        let mut issues = Vec::new();
        for base in self.bases(doc) {
            self.validate_definition(doc, &base, &mut issues);
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}
