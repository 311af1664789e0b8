use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{GraphError, Result};

/// One path component: a name plus an optional same-name-sibling index
///
/// An absent index means "the first or only child with this name". Segments
/// order by name first and index second, with the unindexed form sorting ahead
/// of every indexed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    name: String,
    index: Option<u32>,
}

impl Segment {
    /// Segment without a disambiguation index
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// Segment carrying an explicit 1-based index
    pub fn with_index(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> Option<u32> {
        self.index
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// Index used for ordering among same-name siblings (`None` counts as 1)
    pub fn effective_index(&self) -> u32 {
        self.index.unwrap_or(1)
    }
}

/// Check that a name can be used as a segment name
///
/// Names are non-empty and may not contain the path separator or the index
/// brackets.
///
/// # Errors
/// Returns `ArgumentValidation` naming `argument` when the name is unusable.
pub fn validate_name(argument: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GraphError::invalid_argument(
            argument,
            "name cannot be empty or whitespace-only",
        ));
    }
    if name.contains(['/', '[', ']']) {
        return Err(GraphError::invalid_argument(
            argument,
            format!("name '{}' contains a reserved character", name),
        ));
    }
    Ok(())
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for Segment {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        let Some(open) = s.find('[') else {
            validate_name("segment", s)?;
            return Ok(Segment::new(s));
        };

        let name = &s[..open];
        let rest = &s[open + 1..];
        let digits = rest.strip_suffix(']').ok_or_else(|| {
            GraphError::invalid_argument("segment", format!("'{}' has an unterminated index", s))
        })?;
        validate_name("segment", name)?;

        let index: u32 = digits.parse().map_err(|_| {
            GraphError::invalid_argument("segment", format!("'{}' has a non-numeric index", s))
        })?;
        if index == 0 {
            return Err(GraphError::invalid_argument(
                "segment",
                format!("'{}' has index 0; indices start at 1", s),
            ));
        }
        Ok(Segment::with_index(name, index))
    }
}

/// Absolute, immutable sequence of segments from the root
///
/// Two paths are equal only when their segment sequences match exactly, so
/// `/a/x` and `/a/x[1]` are different paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Parent path, or `None` for the root
    pub fn parent(&self) -> Option<Path> {
        if self.is_root() {
            return None;
        }
        Some(Path {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn child(&self, segment: Segment) -> Path {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Path { segments }
    }

    /// True if `self` is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.len() < other.len() && other.segments[..self.len()] == self.segments[..]
    }

    /// True if `self` equals `other` or is one of its ancestors
    pub fn is_at_or_above(&self, other: &Path) -> bool {
        self == other || self.is_ancestor_of(other)
    }

    /// Path obtained by replacing the `prefix` part of `self` with `replacement`
    ///
    /// Returns `None` when `prefix` is not at or above `self`.
    pub fn rebase(&self, prefix: &Path, replacement: &Path) -> Option<Path> {
        if !prefix.is_at_or_above(self) {
            return None;
        }
        let mut segments = replacement.segments.clone();
        segments.extend_from_slice(&self.segments[prefix.len()..]);
        Some(Path { segments })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        let Some(rest) = s.strip_prefix('/') else {
            return Err(GraphError::invalid_argument(
                "path",
                format!("'{}' is not absolute", s),
            ));
        };
        if rest.is_empty() {
            return Ok(Path::root());
        }
        let segments = rest
            .split('/')
            .map(Segment::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Path { segments })
    }
}
