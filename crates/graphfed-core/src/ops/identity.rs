use super::store::NodeStore;
use crate::errors::{GraphError, Result};
use crate::model::{NodeId, Path, PropertyValue, IDENTITY_PROPERTY};

/// How identities are treated when a branch is duplicated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Every copied node receives a newly generated identity (plain copies)
    Fresh,
    /// Identities travel with the nodes (move implemented as copy + delete)
    Preserve,
}

/// Read a node's identity without assigning one
///
/// # Errors
/// `BackingStore` if the node is missing or its identity property is malformed.
pub fn read_identity<S: NodeStore + ?Sized>(store: &S, path: &Path) -> Result<Option<NodeId>> {
    let Some(values) = store.property(path, IDENTITY_PROPERTY)? else {
        return Ok(None);
    };
    match values.first() {
        None => Ok(None),
        Some(value) => value.as_node_id().map(Some).ok_or_else(|| {
            GraphError::store(
                "read_identity",
                format!("identity property of {} is not a UUID", path),
            )
        }),
    }
}

/// Return the node's identity, generating and persisting one if it has none
pub fn ensure_identity<S: NodeStore + ?Sized>(store: &mut S, path: &Path) -> Result<NodeId> {
    if let Some(id) = read_identity(store, path)? {
        return Ok(id);
    }
    let id = NodeId::generate();
    store.put_property(path, IDENTITY_PROPERTY, vec![PropertyValue::Uuid(id)])?;
    tracing::trace!(path = %path, node_id = %id, "assigned identity");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Segment;
    use crate::ops::MemoryStore;

    fn store_with_child() -> (MemoryStore, Path) {
        let mut store = MemoryStore::new();
        store.add_child(&Path::root(), &Segment::new("a")).unwrap();
        (store, "/a".parse().unwrap())
    }

    #[test]
    fn test_ensure_identity_assigns_once() {
        let (mut store, path) = store_with_child();
        assert_eq!(read_identity(&store, &path).unwrap(), None);

        let first = ensure_identity(&mut store, &path).unwrap();
        let second = ensure_identity(&mut store, &path).unwrap();
        assert_eq!(first, second);
        assert_eq!(read_identity(&store, &path).unwrap(), Some(first));
    }

    #[test]
    fn test_malformed_identity_is_store_failure() {
        let (mut store, path) = store_with_child();
        store
            .put_property(&path, IDENTITY_PROPERTY, vec![PropertyValue::Long(7)])
            .unwrap();
        assert!(matches!(
            read_identity(&store, &path),
            Err(GraphError::BackingStore { .. })
        ));
    }
}
