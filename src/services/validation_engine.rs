//! Whole-document validation with touched filtering.
//!
//! The document is validated in full on every mutation, but an issue only
//! reaches the error tree when its field has been touched, or when the
//! wizard has switched to validate-all (step advance, submit).

use tracing::debug;

use super::touch_tracker::TouchTracker;
use crate::domain::models::document::Document;
use crate::domain::models::issue::{ErrorTree, Issue, DEFAULT_MESSAGE_SEPARATOR};
use crate::domain::ports::SchemaValidator;

/// Maps schema issues into a filtered [`ErrorTree`].
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    separator: String,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_MESSAGE_SEPARATOR)
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// Validate `doc` and keep the issues the user should see.
    ///
    /// An empty tree only means nothing is surfaced; untouched fields may
    /// still be invalid unless `validate_all` was set.
    pub fn validate(
        &self,
        doc: &Document,
        validator: &dyn SchemaValidator,
        touched: &TouchTracker,
        validate_all: bool,
    ) -> ErrorTree {
        let issues = match validator.validate(doc) {
            Ok(()) => return ErrorTree::new(),
            Err(issues) => issues,
        };

        let total = issues.len();
        let tree = self.build_tree(
            issues
                .iter()
                .filter(|issue| validate_all || touched.is_touched(&issue.path)),
        );

        debug!(
            issues = total,
            surfaced = tree.len(),
            validate_all,
            "document validated"
        );
        tree
    }

    /// Every issue, unfiltered. Also used for field errors returned by a
    /// backend so they render through the same pipeline.
    pub fn issues_to_tree<'a>(&self, issues: impl IntoIterator<Item = &'a Issue>) -> ErrorTree {
        self.build_tree(issues)
    }

    fn build_tree<'a>(&self, issues: impl IntoIterator<Item = &'a Issue>) -> ErrorTree {
        let mut tree = ErrorTree::new();
        for issue in issues {
            tree.insert_with(&issue.path, &issue.message, &self.separator);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::path::Path;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    fn always_failing(doc: &Document) -> Result<(), Vec<Issue>> {
        let _ = doc;
        Err(vec![
            Issue::new(p("Name"), "Required"),
            Issue::new(p("Config.Limits.Max"), "Too large"),
            Issue::new(p("Config.Limits.Max"), "Not an integer"),
        ])
    }

    #[test]
    fn test_untouched_issues_are_hidden() {
        let tree = ValidationEngine::new().validate(
            &Document::record(),
            &always_failing,
            &TouchTracker::new(),
            false,
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn test_touched_issue_is_surfaced() {
        let mut touched = TouchTracker::new();
        touched.touch(&[p("Name")]).unwrap();
        let tree =
            ValidationEngine::new().validate(&Document::record(), &always_failing, &touched, false);
        assert_eq!(tree.get(&p("Name")), Some("Required"));
        assert!(tree.get(&p("Config.Limits.Max")).is_none());
    }

    #[test]
    fn test_touched_descendant_surfaces_parent_issue() {
        let mut touched = TouchTracker::new();
        touched.touch(&[p("Config.Limits.Max.Detail")]).unwrap();
        let tree =
            ValidationEngine::new().validate(&Document::record(), &always_failing, &touched, false);
        assert!(tree.get(&p("Config.Limits.Max")).is_some());
    }

    #[test]
    fn test_validate_all_surfaces_everything_joined() {
        let tree = ValidationEngine::new().validate(
            &Document::record(),
            &always_failing,
            &TouchTracker::new(),
            true,
        );
        assert_eq!(tree.len(), 2);
        assert_eq!(
            tree.get(&p("Config.Limits.Max")),
            Some("Too large; Not an integer")
        );
    }

    #[test]
    fn test_custom_separator() {
        let tree = ValidationEngine::with_separator(" | ").validate(
            &Document::record(),
            &always_failing,
            &TouchTracker::new(),
            true,
        );
        assert_eq!(
            tree.get(&p("Config.Limits.Max")),
            Some("Too large | Not an integer")
        );
    }

    #[test]
    fn test_valid_document_yields_empty_tree() {
        let ok = |_: &Document| -> Result<(), Vec<Issue>> { Ok(()) };
        let tree = ValidationEngine::new().validate(&Document::record(), &ok, &TouchTracker::new(), true);
        assert!(tree.is_empty());
    }
}
