//! Get / set / unset by path over a form document.

use crate::domain::errors::PathError;
use crate::domain::models::document::{Document, Record};
use crate::domain::models::path::{Path, Segment};

/// Largest sequence a write may create by padding with holes.
pub const MAX_SEQUENCE_LEN: usize = 10_000;

/// Path-addressed access to a [`Document`].
///
/// Reads are defensive: holes, missing keys and scalars on the way all read
/// as absent. Writes are strict: descending through a scalar, or using an
/// index on a record (a field on a sequence), is a programmer error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathAccessor;

fn prefix_string(path: &Path, depth: usize) -> String {
    path.segments()[..depth].iter().cloned().collect::<Path>().to_string()
}

fn not_a_container(path: &Path, depth: usize) -> PathError {
    PathError::NotAContainer {
        path: path.to_string(),
        at: prefix_string(path, depth),
    }
}

fn mismatch(path: &Path, depth: usize, expected: &'static str) -> PathError {
    PathError::SegmentMismatch {
        path: path.to_string(),
        at: prefix_string(path, depth),
        expected,
    }
}

/// Resolve one step downward for writing, creating the container the
/// segment needs when the slot is vacant (`Null`).
fn child_mut<'a>(
    node: &'a mut Document,
    segment: &Segment,
    path: &Path,
    depth: usize,
) -> Result<&'a mut Document, PathError> {
    if node.is_null() {
        *node = match segment {
            Segment::Field(_) => Document::record(),
            Segment::Index(_) => Document::seq(),
        };
    }

    match (node, segment) {
        (Document::Record(map), Segment::Field(name)) => {
            Ok(map.entry(name.clone()).or_insert(Document::Null))
        }
        (Document::Seq(items), Segment::Index(index)) => {
            if *index >= items.len() {
                let len = index
                    .checked_add(1)
                    .filter(|len| *len <= MAX_SEQUENCE_LEN)
                    .ok_or_else(|| PathError::IndexOutOfRange {
                        path: path.to_string(),
                        index: *index,
                        limit: MAX_SEQUENCE_LEN,
                    })?;
                items.resize(len, None);
            }
            Ok(items[*index].get_or_insert(Document::Null))
        }
        (Document::Record(_), Segment::Index(_)) => Err(mismatch(path, depth, "a field name")),
        (Document::Seq(_), Segment::Field(_)) => Err(mismatch(path, depth, "an index")),
        _ => Err(not_a_container(path, depth)),
    }
}

impl PathAccessor {
    pub fn new() -> Self {
        Self
    }

    /// Value at `path`, or `None` if anything along the way is absent.
    pub fn get<'a>(&self, doc: &'a Document, path: &Path) -> Option<&'a Document> {
        path.segments()
            .iter()
            .try_fold(doc, |node, segment| match (node, segment) {
                (Document::Record(map), Segment::Field(name)) => map.get(name),
                (Document::Seq(items), Segment::Index(i)) => items.get(*i).and_then(Option::as_ref),
                _ => None,
            })
    }

    /// True if some value (including `Null`) is stored at `path`.
    pub fn contains(&self, doc: &Document, path: &Path) -> bool {
        self.get(doc, path).is_some()
    }

    /// Mutable handle to the slot at `path`, creating intermediates.
    pub fn slot_mut<'a>(
        &self,
        doc: &'a mut Document,
        path: &Path,
    ) -> Result<&'a mut Document, PathError> {
        let mut node = doc;
        for (depth, segment) in path.segments().iter().enumerate() {
            node = child_mut(node, segment, path, depth)?;
        }
        Ok(node)
    }

    /// Overwrite the value at `path`, creating missing records/sequences.
    pub fn set(&self, doc: &mut Document, path: &Path, value: Document) -> Result<(), PathError> {
        *self.slot_mut(doc, path)? = value;
        Ok(())
    }

    /// Remove the value at `path` and everything under it.
    ///
    /// A record key is deleted; a sequence slot becomes a hole and the
    /// sequence keeps its length. Returns `false` when nothing was there.
    pub fn unset(&self, doc: &mut Document, path: &Path) -> Result<bool, PathError> {
        let Some((last, parents)) = path.segments().split_last() else {
            let existed = !matches!(doc, Document::Record(map) if map.is_empty());
            *doc = Document::record();
            return Ok(existed);
        };

        let mut node = doc;
        for (depth, segment) in parents.iter().enumerate() {
            node = match (node, segment) {
                (Document::Null, _) => return Ok(false),
                (Document::Record(map), Segment::Field(name)) => match map.get_mut(name) {
                    Some(child) => child,
                    None => return Ok(false),
                },
                (Document::Seq(items), Segment::Index(i)) => {
                    match items.get_mut(*i).and_then(Option::as_mut) {
                        Some(child) => child,
                        None => return Ok(false),
                    }
                }
                (Document::Record(_), Segment::Index(_)) => {
                    return Err(mismatch(path, depth, "a field name"))
                }
                (Document::Seq(_), Segment::Field(_)) => {
                    return Err(mismatch(path, depth, "an index"))
                }
                _ => return Err(not_a_container(path, depth)),
            };
        }

        let depth = parents.len();
        match (node, last) {
            (Document::Null, _) => Ok(false),
            (Document::Record(map), Segment::Field(name)) => Ok(map.shift_remove(name).is_some()),
            (Document::Seq(items), Segment::Index(i)) => {
                Ok(items.get_mut(*i).and_then(Option::take).is_some())
            }
            (Document::Record(_), Segment::Index(_)) => Err(mismatch(path, depth, "a field name")),
            (Document::Seq(_), Segment::Field(_)) => Err(mismatch(path, depth, "an index")),
            _ => Err(not_a_container(path, depth)),
        }
    }

    /// Record at `path`, if that is what is stored there.
    pub fn record<'a>(&self, doc: &'a Document, path: &Path) -> Option<&'a Record> {
        self.get(doc, path).and_then(Document::as_record)
    }
}
