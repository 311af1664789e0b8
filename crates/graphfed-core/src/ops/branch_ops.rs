//! Structural edits on whole branches, built from store primitives and the
//! ordered-children index.

use super::child_list::{
    read_child_list, register_child, rename_child, reposition_child, unregister_child,
    write_child_list, Registration,
};
use super::identity::{ensure_identity, IdentityPolicy};
use super::store::NodeStore;
use crate::errors::{GraphError, Result};
use crate::model::{
    NodeId, Path, PropertyMap, PropertyValue, Segment, CHILD_LIST_PROPERTY, IDENTITY_PROPERTY,
};

/// Where a copied branch ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Path of the original after any sibling renumbering at the destination;
    /// for a move, where it was when it got deleted, renumbered ancestors included
    pub original: Path,
    /// Root of the new copy
    pub copy: Path,
    /// Index update performed on the destination parent
    pub registration: Registration,
}

/// Add a new child, registering it with the parent's index first
///
/// Returns the path of the new, empty child.
pub fn add_registered_child<S: NodeStore + ?Sized>(
    store: &mut S,
    parent: &Path,
    name: &str,
) -> Result<(Path, Registration)> {
    let registration = register_child(store, parent, name, true)?;
    let segment = registration
        .segment
        .clone()
        .ok_or_else(|| internal("registration of a new child returned no segment"))?;
    store.add_child(parent, &segment)?;
    Ok((parent.child(segment), registration))
}

/// Copy `original` and its subtree as a new last child of `new_parent`
///
/// # Errors
/// * `ArgumentValidation` - root copy, or copy into the original's own subtree
/// * `BackingStore` - any primitive failed
pub fn copy_branch<S: NodeStore + ?Sized>(
    store: &mut S,
    original: &Path,
    new_parent: &Path,
    policy: IdentityPolicy,
) -> Result<CopyOutcome> {
    let segment = original
        .last_segment()
        .ok_or_else(|| GraphError::invalid_argument("from", "the root cannot be copied"))?;
    if original.is_at_or_above(new_parent) {
        return Err(GraphError::invalid_argument(
            "into",
            format!("{} lies inside the copied branch {}", new_parent, original),
        ));
    }

    let (copy, registration) = add_registered_child(store, new_parent, segment.name())?;
    let original = registration.remap(new_parent, original);
    copy_content(store, &original, &copy, policy)?;

    Ok(CopyOutcome {
        original,
        copy,
        registration,
    })
}

/// Copy properties and descendants of `from` onto the empty node `to`
///
/// Child segments are reused verbatim: the source list already satisfies the
/// index invariant.
fn copy_content<S: NodeStore + ?Sized>(
    store: &mut S,
    from: &Path,
    to: &Path,
    policy: IdentityPolicy,
) -> Result<()> {
    let mut pending = vec![(from.clone(), to.clone())];
    while let Some((source, target)) = pending.pop() {
        let mut properties = store.properties(&source)?;
        properties.remove(CHILD_LIST_PROPERTY);
        if policy == IdentityPolicy::Fresh {
            properties.insert(
                IDENTITY_PROPERTY.to_string(),
                vec![PropertyValue::Uuid(NodeId::generate())],
            );
        }
        store.replace_properties(&target, properties)?;

        let children = read_child_list(store, &source)?;
        for child in &children {
            store.add_child(&target, child)?;
            pending.push((source.child(child.clone()), target.child(child.clone())));
        }
        if !children.is_empty() {
            write_child_list(store, &target, &children)?;
        }
    }
    Ok(())
}

/// Move `original` under `new_parent` as copy-then-delete, preserving identity
///
/// `before`, when given, is a child of `new_parent` before which the moved node
/// is placed; otherwise it goes last.
///
/// # Errors
/// * `ArgumentValidation` - root move, move into own subtree, bad anchor
/// * `MoveLeftCopy` - the copy exists but the original could not be removed
pub fn move_branch<S: NodeStore + ?Sized>(
    store: &mut S,
    original: &Path,
    new_parent: &Path,
    before: Option<&Path>,
) -> Result<CopyOutcome> {
    if original.is_root() {
        return Err(GraphError::invalid_argument(
            "from",
            "the root cannot be moved",
        ));
    }
    if original.is_at_or_above(new_parent) {
        return Err(GraphError::invalid_argument(
            "into",
            format!("{} lies inside the moved branch {}", new_parent, original),
        ));
    }
    if let Some(anchor) = before {
        if anchor.parent().as_ref() != Some(new_parent) {
            return Err(GraphError::invalid_argument(
                "before",
                format!("{} is not a child of {}", anchor, new_parent),
            ));
        }
        if anchor == original {
            return Err(GraphError::invalid_argument(
                "before",
                "a node cannot be placed before itself",
            ));
        }
    }

    ensure_identity(store, original)?;
    let mut outcome = copy_branch(store, original, new_parent, IdentityPolicy::Preserve)?;
    let mut anchor = before.map(|a| outcome.registration.remap(new_parent, a));

    if let Err(err) = delete_branch(store, &outcome.original) {
        return Err(GraphError::MoveLeftCopy {
            from: outcome.original,
            copy: outcome.copy,
            message: err.to_string(),
        });
    }

    // Within one parent the copy was numbered next to the original it replaces
    if outcome.original.parent().as_ref() == Some(new_parent) {
        let name = last_segment(&outcome.copy)?.name().to_string();
        let registration = register_child(store, new_parent, &name, false)?;
        outcome.copy = registration.remap(new_parent, &outcome.copy);
        outcome.original = registration.remap(new_parent, &outcome.original);
        anchor = anchor.map(|a| registration.remap(new_parent, &a));
        outcome.registration.renamed.extend(registration.renamed);
    }

    if let Some(anchor) = anchor {
        let moved = last_segment(&outcome.copy)?;
        let anchor_segment = last_segment(&anchor)?;
        let registration =
            reposition_child(store, new_parent, &moved, Some(&anchor_segment))?;
        let segment = registration
            .segment
            .clone()
            .ok_or_else(|| internal("reposition returned no segment"))?;
        outcome.copy = new_parent.child(segment);
        outcome.original = registration.remap(new_parent, &outcome.original);
        outcome.registration.renamed.extend(registration.renamed);
    }
    Ok(outcome)
}

/// Remove a node and its subtree, dropping its entry from the parent's index
///
/// Remaining same-named siblings keep their indices until the next create or
/// rename touching that name.
pub fn delete_branch<S: NodeStore + ?Sized>(store: &mut S, path: &Path) -> Result<()> {
    let (parent, segment) = split(path, "the root cannot be deleted")?;
    store.remove_child(&parent, &segment)?;
    unregister_child(store, &parent, &segment)
}

/// Rename a node in place; returns its new path
pub fn rename_node<S: NodeStore + ?Sized>(
    store: &mut S,
    path: &Path,
    new_name: &str,
) -> Result<(Path, Registration)> {
    let (parent, segment) = split(path, "the root cannot be renamed")?;
    let registration = rename_child(store, &parent, &segment, new_name)?;
    let new_segment = registration
        .segment
        .clone()
        .ok_or_else(|| internal("rename returned no segment"))?;
    Ok((parent.child(new_segment), registration))
}

/// Strip a node down to its identity: all other properties and all children go
pub fn clear_node<S: NodeStore + ?Sized>(store: &mut S, path: &Path) -> Result<()> {
    let id = ensure_identity(store, path)?;
    for child in store.child_segments(path)? {
        store.remove_child(path, &child)?;
    }
    let mut properties = PropertyMap::new();
    properties.insert(IDENTITY_PROPERTY.to_string(), vec![PropertyValue::Uuid(id)]);
    store.replace_properties(path, properties)
}

fn split(path: &Path, root_reason: &str) -> Result<(Path, Segment)> {
    match (path.parent(), path.last_segment()) {
        (Some(parent), Some(segment)) => Ok((parent, segment.clone())),
        _ => Err(GraphError::invalid_argument("path", root_reason)),
    }
}

fn last_segment(path: &Path) -> Result<Segment> {
    path.last_segment()
        .cloned()
        .ok_or_else(|| internal(format!("{} has no last segment", path)))
}

fn internal(message: impl Into<String>) -> GraphError {
    GraphError::Internal {
        message: message.into(),
    }
}
