//! Path domain model.
//!
//! A path addresses one location inside a form document. Externally it is a
//! dotted/bracketed string (`InputDataConfig[0].Dataset.Name`); internally it
//! is a sequence of field-name and index segments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::PathParseError;

/// One step of a path: a record field or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Named record field
    Field(String),
    /// Position inside a sequence
    Index(usize),
}

impl Segment {
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            Self::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Field(_) => None,
        }
    }
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Address of a location in a document.
///
/// The empty path is the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path(Vec<Segment>);

impl Path {
    /// The root path (no segments).
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted/bracketed path string.
    ///
    /// Grammar: `segment ('.' segment | '[' integer ']')*`. The leading segment
    /// may itself be an index (`[0].Name`). The empty string is the root.
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        let bytes = input.as_bytes();
        let mut segments = Vec::new();
        let mut pos = 0;

        let fail = |position: usize, reason: &str| PathParseError {
            input: input.to_string(),
            position,
            reason: reason.to_string(),
        };

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    let close = input[pos..]
                        .find(']')
                        .map(|offset| pos + offset)
                        .ok_or_else(|| fail(pos, "unterminated index"))?;
                    let digits = &input[pos + 1..close];
                    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(fail(pos + 1, "index must be a non-negative integer"));
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| fail(pos + 1, "index out of range"))?;
                    segments.push(Segment::Index(index));
                    pos = close + 1;
                }
                b'.' => {
                    if segments.is_empty() {
                        return Err(fail(pos, "path cannot start with '.'"));
                    }
                    pos += 1;
                    let end = field_end(bytes, pos);
                    if end == pos {
                        return Err(fail(pos, "empty field name"));
                    }
                    segments.push(Segment::Field(input[pos..end].to_string()));
                    pos = end;
                }
                b']' => return Err(fail(pos, "unexpected ']'")),
                _ => {
                    if !segments.is_empty() {
                        return Err(fail(pos, "expected '.' or '[' between segments"));
                    }
                    let end = field_end(bytes, pos);
                    segments.push(Segment::Field(input[pos..end].to_string()));
                    pos = end;
                }
            }
        }

        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a field segment, returning the extended path.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(Segment::Field(name.into()));
        self
    }

    /// Append an index segment, returning the extended path.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Segment::Index(index));
        self
    }

    /// Concatenate `other` after `self`.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.0.push(segment.into());
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// True if `prefix` is equal to this path or one of its ancestors.
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Iterate over every proper ancestor, shortest first (root excluded).
    pub fn ancestors(&self) -> impl Iterator<Item = Path> + '_ {
        (1..self.0.len()).map(move |n| Self(self.0[..n].to_vec()))
    }
}

fn field_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| matches!(b, b'.' | b'[' | b']'))
        .map_or(bytes.len(), |offset| start + offset)
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Field(name) if i == 0 => write!(f, "{name}")?,
                Segment::Field(name) => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = PathParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
