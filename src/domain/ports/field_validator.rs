/// Per-field rule for a single hyperparameter value.
///
/// Implementations receive the raw string the user typed; empty optional
/// values are filtered out before the rule runs.
pub trait FieldValidator: Send + Sync {
    /// `Err` carries a human-readable message without a field prefix.
    fn check(&self, value: &str) -> Result<(), String>;
}

impl<F> FieldValidator for F
where
    F: Fn(&str) -> Result<(), String> + Send + Sync,
{
    fn check(&self, value: &str) -> Result<(), String> {
        self(value)
    }
}
