use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::path::Path;
use crate::errors::{GraphError, Result};

/// Opaque, stable identity of a node
///
/// Assigned lazily the first time a node is read or created, kept across
/// moves and replaced by a fresh one on copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a new random identity
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(NodeId)
            .map_err(|e| GraphError::invalid_argument("node_id", e.to_string()))
    }
}

/// Reference to one node by path, by identity, or both
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    path: Option<Path>,
    id: Option<NodeId>,
}

impl Location {
    pub fn new(path: Path, id: NodeId) -> Self {
        Self {
            path: Some(path),
            id: Some(id),
        }
    }

    pub fn at_path(path: Path) -> Self {
        Self {
            path: Some(path),
            id: None,
        }
    }

    pub fn with_id(id: NodeId) -> Self {
        Self {
            path: None,
            id: Some(id),
        }
    }

    pub fn root() -> Self {
        Self::at_path(Path::root())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn has_path(&self) -> bool {
        self.path.is_some()
    }

    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// A location is complete once it carries a resolvable path
    pub fn is_complete(&self) -> bool {
        self.has_path()
    }

    /// "Same location" equivalence
    ///
    /// Identities decide when both sides carry one; otherwise both paths must be
    /// present and structurally equal.
    pub fn is_same(&self, other: &Location) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => match (&self.path, &other.path) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, &self.id) {
            (Some(path), Some(id)) => write!(f, "{} <{}>", path, id),
            (Some(path), None) => write!(f, "{}", path),
            (None, Some(id)) => write!(f, "<{}>", id),
            (None, None) => f.write_str("<unresolved>"),
        }
    }
}

impl From<Path> for Location {
    fn from(path: Path) -> Self {
        Location::at_path(path)
    }
}
