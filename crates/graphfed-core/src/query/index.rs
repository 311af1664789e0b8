use std::sync::Arc;

use super::constraint::Constraint;
use super::results::{IndexProvider, LazyResults, Results};
use crate::errors::Result;
use crate::model::{NodeId, Path, PropertyMap, CHILD_LIST_PROPERTY};
use crate::ops::{ensure_identity, read_child_list, NodeStore};

/// Indexed view of one node
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub key: NodeId,
    pub path: Path,
    pub properties: PropertyMap,
}

/// Snapshot of every node's properties, in document order
///
/// Building it assigns identities to nodes that lack one, since identities
/// are the keys results are reported by.
#[derive(Debug, Clone)]
pub struct PropertyIndex {
    entries: Arc<[IndexEntry]>,
}

impl PropertyIndex {
    /// Walk the store depth-first, children in list order
    pub fn build<S: NodeStore + ?Sized>(store: &mut S) -> Result<Self> {
        let mut entries = Vec::new();
        let mut pending = vec![Path::root()];
        while let Some(path) = pending.pop() {
            let key = ensure_identity(store, &path)?;
            let mut properties = store.properties(&path)?;
            properties.remove(CHILD_LIST_PROPERTY);

            let children = read_child_list(store, &path)?;
            pending.extend(children.into_iter().rev().map(|s| path.child(s)));
            entries.push(IndexEntry {
                key,
                path,
                properties,
            });
        }
        tracing::debug!(entries = entries.len(), "built property index");
        Ok(Self {
            entries: entries.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, key: NodeId) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

impl IndexProvider for PropertyIndex {
    fn filter(&self, constraints: Vec<Constraint>, cardinality_estimate: u64) -> Box<dyn Results> {
        Box::new(LazyResults::new(
            Arc::clone(&self.entries),
            constraints,
            cardinality_estimate,
        ))
    }
}
