//! Touched-field tracking.
//!
//! A boolean tree parallel to the form document. A path counts as touched
//! when anything is stored at it, so touching `a.b` also makes `a` count.

use tracing::trace;

use super::mutation_reducer::MutationMethod;
use super::path_accessor::PathAccessor;
use crate::domain::errors::DomainResult;
use crate::domain::models::document::Document;
use crate::domain::models::path::Path;

/// Records which fields the user has interacted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchTracker {
    touched: Document,
    accessor: PathAccessor,
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchTracker {
    pub fn new() -> Self {
        Self {
            touched: Document::record(),
            accessor: PathAccessor::new(),
        }
    }

    /// Rebuild a tracker from a stored touched tree.
    pub fn from_document(touched: Document) -> Self {
        Self {
            touched,
            accessor: PathAccessor::new(),
        }
    }

    /// Mark `paths` as touched.
    pub fn touch<'a>(&mut self, paths: impl IntoIterator<Item = &'a Path>) -> DomainResult<()> {
        self.apply(paths, MutationMethod::Set)
    }

    /// Clear `paths` and everything under them.
    pub fn untouch<'a>(&mut self, paths: impl IntoIterator<Item = &'a Path>) -> DomainResult<()> {
        self.apply(paths, MutationMethod::Unset)
    }

    /// Apply one method to every path as a single batch.
    ///
    /// `Set` and `Merge` both mark; `Unset` clears.
    pub fn apply<'a>(
        &mut self,
        paths: impl IntoIterator<Item = &'a Path>,
        method: MutationMethod,
    ) -> DomainResult<()> {
        let mut next = self.touched.clone();
        for path in paths {
            trace!(path = %path, method = method.as_str(), "touch");
            match method {
                MutationMethod::Set | MutationMethod::Merge => self.mark(&mut next, path)?,
                MutationMethod::Unset => {
                    self.accessor.unset(&mut next, path)?;
                }
            }
        }
        self.touched = next;
        Ok(())
    }

    /// Writes are lenient: a boolean leaf standing where a container is
    /// needed gets replaced by that container.
    fn mark(&self, tree: &mut Document, path: &Path) -> DomainResult<()> {
        if path.is_root() {
            return Ok(());
        }
        for ancestor in path.ancestors() {
            if self
                .accessor
                .get(tree, &ancestor)
                .is_some_and(Document::is_scalar)
            {
                self.accessor.set(tree, &ancestor, Document::Null)?;
            }
        }
        if self
            .accessor
            .get(tree, path)
            .is_some_and(|node| !node.is_scalar())
        {
            // An already touched subtree stays as it is.
            return Ok(());
        }
        self.accessor.set(tree, path, Document::Bool(true))?;
        Ok(())
    }

    /// True when anything is recorded at `path`. The root is never touched.
    pub fn is_touched(&self, path: &Path) -> bool {
        !path.is_root() && self.accessor.contains(&self.touched, path)
    }

    pub fn is_empty(&self) -> bool {
        self.touched
            .as_record()
            .map_or(true, indexmap::IndexMap::is_empty)
    }

    pub fn clear(&mut self) {
        self.touched = Document::record();
    }

    pub fn snapshot(&self) -> &Document {
        &self.touched
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
    fn test_touch_marks_path_and_ancestors() {
        let mut tracker = TouchTracker::new();
        tracker.touch(&[p("a.b[1].c")]).unwrap();
        assert!(tracker.is_touched(&p("a.b[1].c")));
        assert!(tracker.is_touched(&p("a.b")));
        assert!(tracker.is_touched(&p("a")));
        assert!(!tracker.is_touched(&p("a.b[0]")));
        assert!(!tracker.is_touched(&p("a.b[1].c.d")));
    }

    #[test]
    fn test_trackers_compare_by_touched_tree() {
        let mut left = TouchTracker::new();
        left.touch(&[p("a.b")]).unwrap();
        let right = TouchTracker::from_document(json!({"a": {"b": true}}).into());
        assert_eq!(left, right);

        left.untouch(&[p("a")]).unwrap();
        assert_ne!(left, right);
        assert_eq!(left, TouchTracker::new());
    }

    #[test]
    fn test_touch_deeper_than_leaf_upgrades() {
        let mut tracker = TouchTracker::new();
        tracker.touch(&[p("a")]).unwrap();
        tracker.touch(&[p("a.b")]).unwrap();
        assert!(tracker.is_touched(&p("a.b")));
        assert_eq!(tracker.snapshot().to_json(), json!({"a": {"b": true}}));
    }

    #[test]
    fn test_touch_parent_keeps_touched_children() {
        let mut tracker = TouchTracker::new();
        tracker.touch(&[p("a.b")]).unwrap();
        tracker.touch(&[p("a")]).unwrap();
        assert!(tracker.is_touched(&p("a.b")));
    }

    #[test]
    fn test_untouch_clears_subtree() {
        let mut tracker = TouchTracker::new();
        tracker.touch(&[p("r[0].MinValue"), p("r[0].MaxValue"), p("name")]).unwrap();
        tracker.untouch(&[p("r[0]")]).unwrap();
        assert!(!tracker.is_touched(&p("r[0].MinValue")));
        assert!(!tracker.is_touched(&p("r[0]")));
        assert!(tracker.is_touched(&p("name")));
    }

    #[test]
    fn test_untouch_missing_is_noop() {
        let mut tracker = TouchTracker::new();
        tracker.untouch(&[p("never.touched")]).unwrap();
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_root_is_never_touched() {
        let mut tracker = TouchTracker::new();
        tracker.touch(&[p("a")]).unwrap();
        assert!(!tracker.is_touched(&Path::root()));
    }
}
