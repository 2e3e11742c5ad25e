use crate::domain::models::document::Document;
use crate::domain::models::issue::Issue;

/// Port for whole-document schema validation
///
/// The engine is agnostic to how the schema is authored. It only relies on
/// this contract: validate the entire document, and report every failure as
/// an [`Issue`] carrying a path and a message.
///
/// Plain closures implement this trait, which keeps test schemas short:
///
/// ```
/// use jobform::domain::models::{Document, Issue, Path};
/// use jobform::domain::ports::SchemaValidator;
///
/// let name_required = |doc: &Document| -> Result<(), Vec<Issue>> {
///     let name = Path::parse("Name").unwrap();
///     match doc.as_record().and_then(|r| r.get("Name")).and_then(Document::as_str) {
///         Some(s) if !s.is_empty() => Ok(()),
///         _ => Err(vec![Issue::new(name, "Required")]),
///     }
/// };
/// assert!(name_required.validate(&Document::record()).is_err());
/// ```
pub trait SchemaValidator: Send + Sync {
    /// `Ok(())` when the document satisfies the schema
    fn validate(&self, document: &Document) -> Result<(), Vec<Issue>>;
}

impl<F> SchemaValidator for F
where
    F: Fn(&Document) -> Result<(), Vec<Issue>> + Send + Sync,
{
    fn validate(&self, document: &Document) -> Result<(), Vec<Issue>> {
        self(document)
    }
}

/// Runs several validators and concatenates their issues.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<std::sync::Arc<dyn SchemaValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, validator: std::sync::Arc<dyn SchemaValidator>) -> Self {
        self.validators.push(validator);
        self
    }
}

impl SchemaValidator for CompositeValidator {
    fn validate(&self, document: &Document) -> Result<(), Vec<Issue>> {
        let issues: Vec<Issue> = self
            .validators
            .iter()
            .filter_map(|validator| validator.validate(document).err())
            .flatten()
            .collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}
