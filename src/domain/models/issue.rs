//! Validation issues and the error tree built from them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use super::document::{Document, Record};
use super::path::{Path, Segment};

/// Separator used when several messages land on the same path.
pub const DEFAULT_MESSAGE_SEPARATOR: &str = "; ";

/// Key under which a message is rendered when its node also has children.
pub const NODE_MESSAGE_KEY: &str = "_errors";

/// One schema-validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub path: Path,
    pub message: String,
}

impl Issue {
    pub fn new(path: Path, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ErrorNode {
    message: Option<String>,
    children: IndexMap<Segment, ErrorNode>,
}

impl ErrorNode {
    fn count(&self) -> usize {
        usize::from(self.message.is_some())
            + self.children.values().map(Self::count).sum::<usize>()
    }

    fn collect(&self, prefix: &Path, out: &mut Vec<(Path, String)>) {
        if let Some(message) = &self.message {
            out.push((prefix.clone(), message.clone()));
        }
        for (segment, child) in &self.children {
            let mut path = prefix.clone();
            path.push(segment.clone());
            child.collect(&path, out);
        }
    }

    fn to_document(&self) -> Document {
        if self.children.is_empty() {
            return self
                .message
                .as_deref()
                .map_or(Document::Null, Document::string);
        }

        let all_indices = self.children.keys().all(|s| s.as_index().is_some());
        if all_indices && self.message.is_none() {
            let len = self
                .children
                .keys()
                .filter_map(Segment::as_index)
                .max()
                .map_or(0, |max| max + 1);
            let mut slots = vec![None; len];
            for (segment, child) in &self.children {
                if let Some(i) = segment.as_index() {
                    slots[i] = Some(child.to_document());
                }
            }
            return Document::Seq(slots);
        }

        let mut record = Record::new();
        if let Some(message) = &self.message {
            record.insert(NODE_MESSAGE_KEY.to_string(), Document::string(message.as_str()));
        }
        for (segment, child) in &self.children {
            let key = match segment {
                Segment::Field(name) => name.clone(),
                Segment::Index(i) => i.to_string(),
            };
            record.insert(key, child.to_document());
        }
        Document::Record(record)
    }
}

/// Document-shaped tree of human-readable validation messages.
///
/// A node may hold a message and children at the same time, so an issue on
/// `a` and another on `a.b` never collide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTree {
    root: ErrorNode,
}

impl ErrorTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unfiltered tree from a list of issues.
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut tree = Self::new();
        for issue in issues {
            tree.insert(&issue.path, &issue.message);
        }
        tree
    }

    pub fn insert(&mut self, path: &Path, message: &str) {
        self.insert_with(path, message, DEFAULT_MESSAGE_SEPARATOR);
    }

    /// Record `message` at `path`, joining with `separator` if one exists.
    pub fn insert_with(&mut self, path: &Path, message: &str, separator: &str) {
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.children.entry(segment.clone()).or_default();
        }
        match &mut node.message {
            Some(existing) => {
                existing.push_str(separator);
                existing.push_str(message);
            }
            None => node.message = Some(message.to_string()),
        }
    }

    fn node(&self, path: &Path) -> Option<&ErrorNode> {
        path.segments()
            .iter()
            .try_fold(&self.root, |node, segment| node.children.get(segment))
    }

    /// Message recorded exactly at `path`.
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.node(path).and_then(|node| node.message.as_deref())
    }

    /// True if any message exists at `path` or below it.
    pub fn contains_under(&self, path: &Path) -> bool {
        self.node(path).is_some_and(|node| node.count() > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.root.count() == 0
    }

    /// Number of distinct paths carrying a message.
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Flattened `(path, message)` pairs, depth first in insertion order.
    pub fn entries(&self) -> Vec<(Path, String)> {
        let mut out = Vec::new();
        self.root.collect(&Path::root(), &mut out);
        out
    }

    /// Top-level field names that carry errors.
    pub fn top_level_keys(&self) -> Vec<&Segment> {
        self.root.children.keys().collect()
    }

    pub fn to_document(&self) -> Document {
        if self.root.children.is_empty() && self.root.message.is_none() {
            return Document::record();
        }
        self.root.to_document()
    }
}

impl Serialize for ErrorTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn test_messages_on_same_path_are_joined() {
        let mut tree = ErrorTree::new();
        tree.insert(&p("a.b"), "Required");
        tree.insert(&p("a.b"), "Too short");
        assert_eq!(tree.get(&p("a.b")), Some("Required; Too short"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_parent_and_child_messages_coexist() {
        let issues = vec![
            Issue::new(p("ranges[1]"), "Minimum value must be less than or equal to maximum value"),
            Issue::new(p("ranges[1].MinValue"), "Min value: must be greater than or equal to 1"),
        ];
        let tree = ErrorTree::from_issues(&issues);
        assert_eq!(tree.len(), 2);
        assert!(tree.contains_under(&p("ranges")));
        assert!(!tree.contains_under(&p("other")));
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({"ranges": [null, {
                "_errors": "Minimum value must be less than or equal to maximum value",
                "MinValue": "Min value: must be greater than or equal to 1"
            }]})
        );
    }

    #[test]
    fn test_empty_tree_renders_empty_record() {
        let tree = ErrorTree::new();
        assert!(tree.is_empty());
        assert_eq!(serde_json::to_value(&tree).unwrap(), json!({}));
    }

    #[test]
    fn test_entries_flatten_in_order() {
        let mut tree = ErrorTree::new();
        tree.insert(&p("Name"), "Required");
        tree.insert(&p("Config.Limits.Max"), "Too large");
        let entries: Vec<String> = tree.entries().iter().map(|(path, _)| path.to_string()).collect();
        assert_eq!(entries, vec!["Name", "Config.Limits.Max"]);
    }
}
