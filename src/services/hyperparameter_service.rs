//! Projection between typed hyperparameters and their wire containers.
//!
//! Nothing here mutates a document. Every operation reads the current
//! snapshot (range entries are addressed by position, so positions must be
//! looked up first) and returns a [`MutationBatch`] that the caller applies
//! in one go.

use tracing::debug;

use super::mutation_reducer::MutationBatch;
use super::path_accessor::PathAccessor;
use crate::domain::errors::{DomainResult, HyperparameterError};
use crate::domain::models::catalog::AlgorithmDefinition;
use crate::domain::models::document::{Document, Record};
use crate::domain::models::hyperparameter::{
    Hyperparameter, HyperparameterType, HyperparameterValue, HYPER_PARAMETER_RANGES,
    STATIC_HYPER_PARAMETERS,
};
use crate::domain::models::path::Path;

/// Locations of the four wire containers under one training definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireContainers {
    base: Path,
}

impl WireContainers {
    /// Containers under `base` (the root for a stand-alone definition form,
    /// `TrainingJobDefinitions[i]` inside a tuning job).
    pub fn at(base: Path) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn static_map(&self) -> Path {
        self.base.clone().field(STATIC_HYPER_PARAMETERS)
    }

    pub fn static_entry(&self, key: &str) -> Path {
        self.static_map().field(key)
    }

    pub fn ranges(&self) -> Path {
        self.base.clone().field(HYPER_PARAMETER_RANGES)
    }

    /// Sequence holding range entries of `kind`; `None` for static.
    pub fn range_list(&self, kind: HyperparameterType) -> Option<Path> {
        kind.range_container().map(|name| self.ranges().field(name))
    }

    /// Path of the wire entry currently holding `key` as `kind`.
    pub fn entry_path(&self, kind: HyperparameterType, key: &str, index: Option<usize>) -> Option<Path> {
        match (kind, index) {
            (HyperparameterType::Static, _) => Some(self.static_entry(key)),
            (kind, Some(i)) => self.range_list(kind).map(|list| list.index(i)),
            (_, None) => None,
        }
    }
}

/// Builds mutation batches for hyperparameter edits.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperparameterService {
    accessor: PathAccessor,
}

fn entry_name(entry: &Document) -> Option<String> {
    entry
        .as_record()
        .and_then(|record| record.get("Name"))
        .and_then(Document::scalar_text)
}

impl HyperparameterService {
    pub fn new() -> Self {
        Self {
            accessor: PathAccessor::new(),
        }
    }

    /// Position of the range entry named `key`, skipping holes.
    pub fn locate(
        &self,
        doc: &Document,
        containers: &WireContainers,
        kind: HyperparameterType,
        key: &str,
    ) -> Option<usize> {
        let list = containers.range_list(kind)?;
        self.accessor
            .get(doc, &list)?
            .indexed_items()
            .find(|(_, entry)| entry_name(entry).as_deref() == Some(key))
            .map(|(i, _)| i)
    }

    /// `locate` for the parameter's current shape.
    pub fn locate_index(
        &self,
        doc: &Document,
        containers: &WireContainers,
        hp: &Hyperparameter,
    ) -> Option<usize> {
        self.locate(doc, containers, hp.kind(), &hp.key)
    }

    /// Every container that currently holds `key`.
    pub fn containers_holding(
        &self,
        doc: &Document,
        containers: &WireContainers,
        key: &str,
    ) -> Vec<HyperparameterType> {
        HyperparameterType::ALL
            .into_iter()
            .filter(|kind| match kind {
                HyperparameterType::Static => self
                    .accessor
                    .record(doc, &containers.static_map())
                    .is_some_and(|map| map.contains_key(key)),
                kind => self.locate(doc, containers, *kind, key).is_some(),
            })
            .collect()
    }

    /// Remove the parameter's current wire entry.
    ///
    /// Static entries lose their map key; range entries leave a hole so the
    /// positions of their neighbours stay stable.
    pub fn removal(&self, doc: &Document, containers: &WireContainers, hp: &Hyperparameter) -> MutationBatch {
        let mut batch = MutationBatch::new();
        let index = self.locate_index(doc, containers, hp);
        if let Some(path) = containers.entry_path(hp.kind(), &hp.key, index) {
            batch.unset(path);
        }
        batch
    }

    /// Append the parameter's wire entry to the container of its shape.
    pub fn insertion(&self, doc: &Document, containers: &WireContainers, hp: &Hyperparameter) -> MutationBatch {
        let mut batch = MutationBatch::new();
        match (&hp.value, containers.range_list(hp.kind())) {
            (HyperparameterValue::Static { value }, _) => {
                batch.set(containers.static_entry(&hp.key), value.as_str());
            }
            (value, Some(list)) => {
                let next_slot = self
                    .accessor
                    .get(doc, &list)
                    .map_or(0, Document::len_with_holes);
                if let Some(entry) = value.range_entry(&hp.key) {
                    batch.set(list.index(next_slot), entry);
                }
            }
            (_, None) => {}
        }
        batch
    }

    /// Add a new parameter.
    pub fn insert(
        &self,
        doc: &Document,
        containers: &WireContainers,
        hp: &Hyperparameter,
    ) -> DomainResult<MutationBatch> {
        if hp.key.is_empty() {
            return Err(HyperparameterError::EmptyKey.into());
        }
        if !self.containers_holding(doc, containers, &hp.key).is_empty() {
            return Err(HyperparameterError::DuplicateKey(hp.key.clone()).into());
        }
        Ok(self.insertion(doc, containers, hp))
    }

    /// Delete a parameter.
    pub fn remove(
        &self,
        doc: &Document,
        containers: &WireContainers,
        hp: &Hyperparameter,
    ) -> DomainResult<MutationBatch> {
        if self.containers_holding(doc, containers, &hp.key).is_empty() {
            return Err(HyperparameterError::UnknownKey(hp.key.clone()).into());
        }
        Ok(self.removal(doc, containers, hp))
    }

    /// Move a parameter to another shape.
    ///
    /// The returned batch removes the old wire entry and appends the new one;
    /// applied together, no intermediate state is ever rendered.
    pub fn change_type(
        &self,
        doc: &Document,
        containers: &WireContainers,
        hp: &Hyperparameter,
        new_type: HyperparameterType,
    ) -> DomainResult<(Hyperparameter, MutationBatch)> {
        if !hp.allows(new_type) {
            return Err(HyperparameterError::TypeNotAllowed {
                key: hp.key.clone(),
                requested: new_type,
            }
            .into());
        }

        let mut updated = hp.clone();
        updated.value = hp.value.convert(new_type, hp.default_scaling);

        let mut batch = self.removal(doc, containers, hp);
        batch.extend(self.insertion(doc, containers, &updated));

        debug!(
            key = %hp.key,
            from = %hp.kind(),
            to = %new_type,
            operations = batch.len(),
            "hyperparameter type changed"
        );
        Ok((updated, batch))
    }

    /// Delete then reinsert under `new_key`, keeping shape and value.
    pub fn rename(
        &self,
        doc: &Document,
        containers: &WireContainers,
        hp: &Hyperparameter,
        new_key: &str,
    ) -> DomainResult<(Hyperparameter, MutationBatch)> {
        if new_key.is_empty() {
            return Err(HyperparameterError::EmptyKey.into());
        }
        if new_key == hp.key {
            return Ok((hp.clone(), MutationBatch::new()));
        }
        if !self.containers_holding(doc, containers, new_key).is_empty() {
            return Err(HyperparameterError::DuplicateKey(new_key.to_string()).into());
        }

        let mut renamed = hp.clone();
        renamed.key = new_key.to_string();

        let mut batch = self.removal(doc, containers, hp);
        batch.extend(self.insertion(doc, containers, &renamed));
        Ok((renamed, batch))
    }

    /// Write a new value for the parameter.
    ///
    /// Range entries are updated in place at their located index; only the
    /// bound/scaling fields are merged so the entry's `Name` is untouched.
    /// A value of a different shape goes through [`Self::change_type`] rules
    /// first and is then written.
    pub fn update_value(
        &self,
        doc: &Document,
        containers: &WireContainers,
        hp: &Hyperparameter,
        value: HyperparameterValue,
    ) -> DomainResult<(Hyperparameter, MutationBatch)> {
        if value.kind() != hp.kind() {
            if !hp.allows(value.kind()) {
                return Err(HyperparameterError::TypeNotAllowed {
                    key: hp.key.clone(),
                    requested: value.kind(),
                }
                .into());
            }
            let mut updated = hp.clone();
            updated.value = value;
            let mut batch = self.removal(doc, containers, hp);
            batch.extend(self.insertion(doc, containers, &updated));
            return Ok((updated, batch));
        }

        let mut updated = hp.clone();
        updated.value = value;
        let index = self.locate_index(doc, containers, hp);

        let mut batch = MutationBatch::new();
        match (&updated.value, index) {
            (HyperparameterValue::Static { value }, _) => {
                batch.set(containers.static_entry(&hp.key), value.as_str());
            }
            (
                HyperparameterValue::Integer { min, max, scaling }
                | HyperparameterValue::Continuous { min, max, scaling },
                Some(i),
            ) => {
                let mut bounds = Record::new();
                bounds.insert("MinValue".to_string(), Document::string(min.as_str()));
                bounds.insert("MaxValue".to_string(), Document::string(max.as_str()));
                bounds.insert("ScalingType".to_string(), Document::string(scaling.as_str()));
                if let Some(path) = containers.entry_path(hp.kind(), &hp.key, Some(i)) {
                    batch.merge(path, Document::Record(bounds));
                }
            }
            (HyperparameterValue::Categorical { values }, Some(i)) => {
                if let Some(path) = containers.entry_path(hp.kind(), &hp.key, Some(i)) {
                    batch.set(
                        path.field("Values"),
                        Document::dense(values.iter().map(|v| Document::string(v.as_str()))),
                    );
                }
            }
            (_, None) => {
                batch.extend(self.insertion(doc, containers, &updated));
            }
        }
        Ok((updated, batch))
    }

    /// Typed view of every parameter stored under `containers`.
    ///
    /// Catalog metadata (type options, constraints, default scaling) is
    /// attached when the algorithm defines the key.
    pub fn read_all(
        &self,
        doc: &Document,
        containers: &WireContainers,
        algorithm: Option<&AlgorithmDefinition>,
    ) -> Vec<Hyperparameter> {
        let mut out = Vec::new();

        if let Some(map) = self.accessor.record(doc, &containers.static_map()) {
            for (key, value) in map {
                let value = HyperparameterValue::Static {
                    value: value.scalar_text().unwrap_or_default(),
                };
                out.push(Hyperparameter::new(key.clone(), value));
            }
        }

        for kind in [
            HyperparameterType::Integer,
            HyperparameterType::Continuous,
            HyperparameterType::Categorical,
        ] {
            let Some(list) = containers
                .range_list(kind)
                .and_then(|path| self.accessor.get(doc, &path))
            else {
                continue;
            };
            for (_, entry) in list.indexed_items() {
                if let Some((key, value)) = HyperparameterValue::from_range_entry(kind, entry) {
                    out.push(Hyperparameter::new(key, value));
                }
            }
        }

        if let Some(algorithm) = algorithm {
            for hp in &mut out {
                if let Some(def) = algorithm.hyperparameter(&hp.key) {
                    def.apply_metadata(hp);
                }
            }
        }
        out
    }

    /// Typed view of a single parameter.
    pub fn read(
        &self,
        doc: &Document,
        containers: &WireContainers,
        algorithm: Option<&AlgorithmDefinition>,
        key: &str,
    ) -> DomainResult<Hyperparameter> {
        self.read_all(doc, containers, algorithm)
            .into_iter()
            .find(|hp| hp.key == key)
            .ok_or_else(|| HyperparameterError::UnknownKey(key.to_string()).into())
    }

    /// Replace all four containers with the algorithm's defaults.
    pub fn seed(&self, containers: &WireContainers, algorithm: &AlgorithmDefinition) -> MutationBatch {
        let mut statics = Record::new();
        let mut integer = Vec::new();
        let mut continuous = Vec::new();
        let mut categorical = Vec::new();

        for def in &algorithm.hyperparameters {
            let hp = def.to_hyperparameter();
            match &hp.value {
                HyperparameterValue::Static { value } => {
                    statics.insert(hp.key.clone(), Document::string(value.as_str()));
                }
                value => {
                    let target = match hp.kind() {
                        HyperparameterType::Integer => &mut integer,
                        HyperparameterType::Continuous => &mut continuous,
                        _ => &mut categorical,
                    };
                    target.extend(value.range_entry(&hp.key));
                }
            }
        }

        let mut ranges = Record::new();
        for (kind, entries) in [
            (HyperparameterType::Integer, integer),
            (HyperparameterType::Continuous, continuous),
            (HyperparameterType::Categorical, categorical),
        ] {
            if let Some(name) = kind.range_container() {
                ranges.insert(name.to_string(), Document::dense(entries));
            }
        }

        let mut batch = MutationBatch::new();
        batch
            .set(containers.static_map(), Document::Record(statics))
            .set(containers.ranges(), Document::Record(ranges));
        batch
    }
}
