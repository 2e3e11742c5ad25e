//! Form document model.
//!
//! A document is a tree of records, sparse sequences and scalars. Sequences
//! keep a stable slot per index: removing an element leaves a hole (`None`)
//! instead of shifting its successors, so positional references held by open
//! editors stay valid.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Record storage; keeps insertion order for display, equality ignores it.
pub type Record = IndexMap<String, Document>;

/// A node of a form document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Document {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Sparse sequence; `None` marks a removed slot.
    Seq(Vec<Option<Document>>),
    Record(Record),
}

impl Document {
    /// An empty record, the usual root of a form.
    pub fn record() -> Self {
        Self::Record(Record::new())
    }

    /// An empty sequence.
    pub const fn seq() -> Self {
        Self::Seq(Vec::new())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Build a dense sequence from present items.
    pub fn dense(items: impl IntoIterator<Item = Document>) -> Self {
        Self::Seq(items.into_iter().map(Some).collect())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Seq(_) => "sequence",
            Self::Record(_) => "record",
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Bool, number or string.
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Number(_) | Self::String(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Option<Document>]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text rendering of a scalar, the way the wire format carries values.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Present items of a sequence, holes filtered out.
    pub fn items(&self) -> impl Iterator<Item = &Document> {
        self.as_seq().into_iter().flatten().flatten()
    }

    /// Present items paired with their stable slot index.
    pub fn indexed_items(&self) -> impl Iterator<Item = (usize, &Document)> {
        self.as_seq()
            .into_iter()
            .flat_map(|items| items.iter().enumerate())
            .filter_map(|(i, item)| item.as_ref().map(|doc| (i, doc)))
    }

    /// Number of present items; holes are not counted.
    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    /// Slot count of a sequence including holes; `0` for non-sequences.
    pub fn len_with_holes(&self) -> usize {
        self.as_seq().map_or(0, <[Option<Document>]>::len)
    }

    /// Copy with every sequence compacted, recursively.
    #[must_use]
    pub fn compacted(&self) -> Self {
        match self {
            Self::Seq(items) => Self::Seq(
                items
                    .iter()
                    .flatten()
                    .map(|item| Some(item.compacted()))
                    .collect(),
            ),
            Self::Record(map) => Self::Record(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.compacted()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// JSON projection. Holes become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Seq(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.as_ref().map_or(Value::Null, Self::to_json))
                    .collect(),
            ),
            Self::Record(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Seq(items.into_iter().map(|v| Some(v.into())).collect()),
            Value::Object(map) => {
                Self::Record(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.to_json()
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Document {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Document {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Document {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<Record> for Document {
    fn from(map: Record) -> Self {
        Self::Record(map)
    }
}

impl FromIterator<(String, Document)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Document)>>(iter: I) -> Self {
        Self::Record(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_conversion_dense() {
        let doc: Document = json!({"a": [1, "x", null], "b": {"c": true}}).into();
        let items = doc.as_record().unwrap()["a"].as_seq().unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(Option::is_some));
        assert_eq!(doc.to_json(), json!({"a": [1, "x", null], "b": {"c": true}}));
    }

    #[test]
    fn test_holes_are_not_counted() {
        let seq = Document::Seq(vec![Some("a".into()), None, Some("c".into())]);
        assert_eq!(seq.len_with_holes(), 3);
        assert_eq!(seq.item_count(), 2);
        let indices: Vec<usize> = seq.indexed_items().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(seq.to_json(), json!(["a", null, "c"]));
    }

    #[test]
    fn test_compacted_is_recursive() {
        let doc: Document = [(
            "ranges".to_string(),
            Document::Seq(vec![None, Some(Document::Seq(vec![None, Some(1i64.into())]))]),
        )]
        .into_iter()
        .collect();
        assert_eq!(doc.compacted().to_json(), json!({"ranges": [[1]]}));
    }

    #[test]
    fn test_record_equality_ignores_order() {
        let a: Document = json!({"x": 1, "y": 2}).into();
        let b: Document = json!({"y": 2, "x": 1}).into();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(Document::from(5i64).scalar_text().as_deref(), Some("5"));
        assert_eq!(Document::from("0.1").scalar_text().as_deref(), Some("0.1"));
        assert_eq!(Document::record().scalar_text(), None);
    }
}
