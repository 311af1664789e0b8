use super::identity::read_identity;
use super::store::NodeStore;
use crate::errors::{GraphError, Result};
use crate::model::{Location, NodeId, Path};

/// Deepest ancestor of `path` that exists in the store
pub fn lowest_existing<S: NodeStore + ?Sized>(store: &S, path: &Path) -> Result<Option<Path>> {
    let mut current = path.parent();
    while let Some(candidate) = current {
        if store.exists(&candidate)? {
            return Ok(Some(candidate));
        }
        current = candidate.parent();
    }
    Ok(None)
}

/// Require that a node exists at `path`
///
/// # Errors
/// `PathNotFound` carrying the deepest ancestor that does exist.
pub fn require_path<S: NodeStore + ?Sized>(store: &S, path: &Path) -> Result<()> {
    if store.exists(path)? {
        return Ok(());
    }
    Err(GraphError::PathNotFound {
        location: Location::at_path(path.clone()),
        lowest_existing: lowest_existing(store, path)?,
    })
}

/// Find the node carrying `id` by walking the tree from the root
pub fn find_by_identity<S: NodeStore + ?Sized>(store: &S, id: NodeId) -> Result<Option<Path>> {
    let mut pending = vec![Path::root()];
    while let Some(path) = pending.pop() {
        if read_identity(store, &path)? == Some(id) {
            return Ok(Some(path));
        }
        for segment in store.child_segments(&path)? {
            pending.push(path.child(segment));
        }
    }
    Ok(None)
}

/// Resolve a location to the path of an existing node
///
/// A path wins when present; identity-only locations are looked up by scanning
/// for the identity property.
///
/// # Errors
/// * `ArgumentValidation` - location carries neither path nor identity
/// * `PathNotFound` - nothing matches
pub fn resolve_location<S: NodeStore + ?Sized>(store: &S, location: &Location) -> Result<Path> {
    if let Some(path) = location.path() {
        require_path(store, path).map_err(|err| match err {
            GraphError::PathNotFound {
                lowest_existing, ..
            } => GraphError::PathNotFound {
                location: location.clone(),
                lowest_existing,
            },
            other => other,
        })?;
        return Ok(path.clone());
    }

    let id = location
        .id()
        .ok_or_else(|| GraphError::invalid_argument("location", "neither path nor identity given"))?;
    find_by_identity(store, id)?.ok_or_else(|| GraphError::PathNotFound {
        location: location.clone(),
        lowest_existing: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Segment;
    use crate::ops::{ensure_identity, MemoryStore};

    fn path(s: &str) -> Path {
        s.parse().unwrap()
    }

    fn sample() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_child(&Path::root(), &Segment::new("a")).unwrap();
        store.add_child(&path("/a"), &Segment::new("b")).unwrap();
        store
    }

    #[test]
    fn test_path_not_found_reports_deepest_ancestor() {
        let store = sample();
        let err = require_path(&store, &path("/a/b/c/d")).unwrap_err();
        match err {
            GraphError::PathNotFound {
                lowest_existing, ..
            } => assert_eq!(lowest_existing, Some(path("/a/b"))),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_root_always_resolves() {
        let store = MemoryStore::new();
        assert_eq!(
            resolve_location(&store, &Location::root()).unwrap(),
            Path::root()
        );
    }

    #[test]
    fn test_identity_only_location_resolves() {
        let mut store = sample();
        let id = ensure_identity(&mut store, &path("/a/b")).unwrap();
        assert_eq!(
            resolve_location(&store, &Location::with_id(id)).unwrap(),
            path("/a/b")
        );
    }

    #[test]
    fn test_unknown_identity_is_path_not_found() {
        let store = sample();
        let err = resolve_location(&store, &Location::with_id(NodeId::generate())).unwrap_err();
        assert!(matches!(err, GraphError::PathNotFound { .. }));
    }
}
