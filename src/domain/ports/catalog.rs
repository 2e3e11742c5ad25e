use crate::domain::models::catalog::{AlgorithmDefinition, ObjectiveMetric};

/// Port for the read-only algorithm catalog
///
/// Supplies the default hyperparameter definitions used to seed a wizard
/// session when an algorithm is (re)selected, and the objective metrics the
/// tuning-objective selector offers.
///
/// # Examples
///
/// ```no_run
/// use jobform::domain::ports::AlgorithmCatalog;
///
/// fn metric_names(catalog: &dyn AlgorithmCatalog, algorithm: &str) -> Vec<String> {
///     catalog
///         .objective_metrics(algorithm)
///         .iter()
///         .map(|m| m.name.clone())
///         .collect()
/// }
/// ```
pub trait AlgorithmCatalog: Send + Sync {
    /// Look up an algorithm by name
    fn algorithm(&self, name: &str) -> Option<&AlgorithmDefinition>;

    /// Names of every algorithm, in catalog order
    fn names(&self) -> Vec<&str>;

    /// Objective metrics of an algorithm; empty when unknown
    fn objective_metrics(&self, name: &str) -> &[ObjectiveMetric] {
        self.algorithm(name)
            .map(|algorithm| algorithm.metadata.objective_metrics.as_slice())
            .unwrap_or_default()
    }
}
