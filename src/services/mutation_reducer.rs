//! Batched document mutations.
//!
//! Every UI event that edits a form becomes one [`MutationBatch`]. The
//! reducer applies the batch to a copy of the current snapshot and only
//! hands the copy back when every operation succeeded, so no observer ever
//! sees a half-applied batch.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::path_accessor::PathAccessor;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::document::Document;
use crate::domain::models::path::Path;

/// How a value is written at its path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationMethod {
    /// Overwrite wholesale (the default)
    #[default]
    #[serde(alias = "default")]
    Set,
    /// Recursively merge records into what is already there
    Merge,
    /// Remove the path and everything under it
    Unset,
}

impl MutationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Merge => "merge",
            Self::Unset => "unset",
        }
    }
}

/// Path → value map, the shape `setFields` receives from the UI.
pub type FieldMap = IndexMap<Path, Document>;

/// One operation of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    pub path: Path,
    pub method: MutationMethod,
    #[serde(default)]
    pub value: Document,
}

/// Ordered list of mutations applied as one logical update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationBatch {
    mutations: Vec<Mutation>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(path, value)` pair with the same method.
    pub fn from_fields(fields: FieldMap, method: MutationMethod) -> Self {
        Self {
            mutations: fields
                .into_iter()
                .map(|(path, value)| Mutation {
                    path,
                    method,
                    value,
                })
                .collect(),
        }
    }

    pub fn push(&mut self, path: Path, method: MutationMethod, value: Document) -> &mut Self {
        self.mutations.push(Mutation {
            path,
            method,
            value,
        });
        self
    }

    pub fn set(&mut self, path: Path, value: impl Into<Document>) -> &mut Self {
        self.push(path, MutationMethod::Set, value.into())
    }

    pub fn merge(&mut self, path: Path, value: impl Into<Document>) -> &mut Self {
        self.push(path, MutationMethod::Merge, value.into())
    }

    pub fn unset(&mut self, path: Path) -> &mut Self {
        self.push(path, MutationMethod::Unset, Document::Null)
    }

    pub fn extend(&mut self, other: Self) -> &mut Self {
        self.mutations.extend(other.mutations);
        self
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Paths removed by this batch.
    pub fn unset_paths(&self) -> impl Iterator<Item = &Path> {
        self.mutations
            .iter()
            .filter(|m| m.method == MutationMethod::Unset)
            .map(|m| &m.path)
    }
}

impl IntoIterator for MutationBatch {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}

/// Applies mutation batches to document snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationReducer {
    accessor: PathAccessor,
}

impl MutationReducer {
    pub fn new() -> Self {
        Self {
            accessor: PathAccessor::new(),
        }
    }

    /// Produce the snapshot that results from applying `batch` to `doc`.
    ///
    /// `doc` is never modified; on error the caller keeps its old snapshot.
    pub fn apply(&self, doc: &Document, batch: &MutationBatch) -> DomainResult<Document> {
        let mut next = doc.clone();
        for mutation in batch.mutations() {
            self.apply_one(&mut next, mutation)?;
        }
        debug!(operations = batch.len(), "mutation batch applied");
        Ok(next)
    }

    /// `setFields(pathValueMap, method)`.
    pub fn apply_fields(
        &self,
        doc: &Document,
        fields: FieldMap,
        method: MutationMethod,
    ) -> DomainResult<Document> {
        self.apply(doc, &MutationBatch::from_fields(fields, method))
    }

    fn apply_one(&self, doc: &mut Document, mutation: &Mutation) -> DomainResult<()> {
        trace!(
            path = %mutation.path,
            method = mutation.method.as_str(),
            "applying mutation"
        );
        match mutation.method {
            MutationMethod::Set => {
                self.accessor
                    .set(doc, &mutation.path, mutation.value.clone())?;
            }
            MutationMethod::Unset => {
                self.accessor.unset(doc, &mutation.path)?;
            }
            MutationMethod::Merge => {
                let slot = self.accessor.slot_mut(doc, &mutation.path)?;
                merge_into(slot, &mutation.value, &mutation.path)?;
            }
        }
        Ok(())
    }
}

/// Deep-merge `value` into `target`.
///
/// Vacant targets take the value as is. Record into record unions keys,
/// recursing where both sides hold records and overwriting otherwise.
fn merge_into(target: &mut Document, value: &Document, path: &Path) -> DomainResult<()> {
    if target.is_null() {
        *target = value.clone();
        return Ok(());
    }

    match (target, value) {
        (Document::Record(existing), Document::Record(incoming)) => {
            for (key, incoming_value) in incoming {
                match existing.get_mut(key) {
                    Some(current)
                        if current.as_record().is_some() && incoming_value.as_record().is_some() =>
                    {
                        merge_into(current, incoming_value, &path.clone().field(key.as_str()))?;
                    }
                    Some(current) => *current = incoming_value.clone(),
                    None => {
                        existing.insert(key.clone(), incoming_value.clone());
                    }
                }
            }
            Ok(())
        }
        (target, value) => Err(DomainError::MergeMismatch {
            path: path.to_string(),
            target: target.kind(),
            value: value.kind(),
        }),
    }
}
