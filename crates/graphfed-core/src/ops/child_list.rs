//! Ordered-children index.
//!
//! Backing stores keep children unordered and know nothing about same-name
//! siblings. Each parent therefore carries a reserved property
//! ([`CHILD_LIST_PROPERTY`]) listing its child segments in order. The functions
//! here keep that list in step with the real children:
//!
//! - a name used by exactly one child carries no index
//! - a name shared by `k >= 2` children carries indices `1..=k` in list order
//! - the list is written back as a whole, only after every rename succeeded
//!
//! Callers must serialize structural edits on the same parent.

use std::str::FromStr;

use super::store::NodeStore;
use crate::errors::{GraphError, Result};
use crate::model::{validate_name, Path, PropertyValue, Segment, CHILD_LIST_PROPERTY};

/// Outcome of an index update on one parent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// Segment of the registered (new, renamed or repositioned) child
    pub segment: Option<Segment>,
    /// Sibling renames performed, as `(old, new)` pairs
    pub renamed: Vec<(Segment, Segment)>,
}

impl Registration {
    /// Map a path below `parent` through the renames performed on `parent`
    pub fn remap(&self, parent: &Path, path: &Path) -> Path {
        for (from, to) in &self.renamed {
            let from_path = parent.child(from.clone());
            if let Some(rebased) = path.rebase(&from_path, &parent.child(to.clone())) {
                return rebased;
            }
        }
        path.clone()
    }
}

/// A child list entry taking part in a renumbering pass
struct Member {
    position: usize,
    current: Option<Segment>,
}

/// Read a parent's ordered child list; a parent without one has no children
pub fn read_child_list<S: NodeStore + ?Sized>(store: &S, parent: &Path) -> Result<Vec<Segment>> {
    let Some(values) = store.property(parent, CHILD_LIST_PROPERTY)? else {
        return Ok(Vec::new());
    };
    values
        .iter()
        .map(|value| {
            value
                .as_str()
                .ok_or_else(|| malformed(parent, "entry is not a string"))
                .and_then(|s| Segment::from_str(s).map_err(|_| malformed(parent, s)))
        })
        .collect()
}

/// Replace a parent's child list; an empty list removes the property
pub fn write_child_list<S: NodeStore + ?Sized>(
    store: &mut S,
    parent: &Path,
    segments: &[Segment],
) -> Result<()> {
    tracing::trace!(parent = %parent, child_count = segments.len(), "writing child list");
    if segments.is_empty() {
        return store.remove_property(parent, CHILD_LIST_PROPERTY);
    }
    let values = segments
        .iter()
        .map(|s| PropertyValue::String(s.to_string()))
        .collect();
    store.put_property(parent, CHILD_LIST_PROPERTY, values)
}

fn malformed(parent: &Path, detail: &str) -> GraphError {
    GraphError::store(
        "read_child_list",
        format!("malformed child list on {}: {}", parent, detail),
    )
}

/// Register a child name with its parent's index
///
/// With `is_new_child` the caller is about to add a child called `name`: an
/// entry is appended and the segment the new child must be stored under is
/// returned. Existing same-named siblings are renamed in the store as needed.
/// Without it, the group of `name` is only renumbered (e.g. after a delete).
///
/// The caller adds the new child itself, using the returned segment.
///
/// # Errors
/// * `ArgumentValidation` - invalid name
/// * `BackingStore` - a sibling rename or the list write failed
pub fn register_child<S: NodeStore + ?Sized>(
    store: &mut S,
    parent: &Path,
    name: &str,
    is_new_child: bool,
) -> Result<Registration> {
    validate_name("name", name)?;
    let mut list = read_child_list(store, parent)?;

    let mut members = group_of(&list, name, None);
    if is_new_child {
        list.push(Segment::new(name));
        members.push(Member {
            position: list.len() - 1,
            current: None,
        });
    }
    if members.is_empty() {
        return Ok(Registration::default());
    }

    let renamed = renumber_group(store, parent, &mut list, name, &members)?;
    if is_new_child || !renamed.is_empty() {
        write_child_list(store, parent, &list)?;
    }

    Ok(Registration {
        segment: if is_new_child { list.last().cloned() } else { None },
        renamed,
    })
}

/// Give an existing child a new name, keeping its list position
///
/// The new name's group is renumbered with the renamed child in it, then the
/// old name's group is renumbered without it.
pub fn rename_child<S: NodeStore + ?Sized>(
    store: &mut S,
    parent: &Path,
    existing: &Segment,
    new_name: &str,
) -> Result<Registration> {
    validate_name("new_name", new_name)?;
    let mut list = read_child_list(store, parent)?;
    let position = position_of(&list, parent, existing)?;
    if existing.name() == new_name {
        return Ok(Registration {
            segment: Some(existing.clone()),
            renamed: Vec::new(),
        });
    }

    let members = group_of(&list, new_name, Some(position));
    let mut renamed = renumber_group(store, parent, &mut list, new_name, &members)?;

    let old_members = group_of(&list, existing.name(), None);
    if !old_members.is_empty() {
        renamed.extend(renumber_group(
            store,
            parent,
            &mut list,
            existing.name(),
            &old_members,
        )?);
    }
    write_child_list(store, parent, &list)?;

    Ok(Registration {
        segment: list.get(position).cloned(),
        renamed,
    })
}

/// Move an existing child to another list position
///
/// The child is placed right before `before`, or last when `before` is `None`.
/// Its name group is renumbered to follow the new order.
pub fn reposition_child<S: NodeStore + ?Sized>(
    store: &mut S,
    parent: &Path,
    segment: &Segment,
    before: Option<&Segment>,
) -> Result<Registration> {
    let mut list = read_child_list(store, parent)?;
    let from = position_of(&list, parent, segment)?;
    let entry = list.remove(from);
    let to = match before {
        Some(anchor) if anchor == segment => {
            return Err(GraphError::invalid_argument(
                "before",
                "a node cannot be placed before itself",
            ))
        }
        Some(anchor) => position_of(&list, parent, anchor)?,
        None => list.len(),
    };
    let name = entry.name().to_string();
    list.insert(to, entry);

    let members = group_of(&list, &name, None);
    let renamed = renumber_group(store, parent, &mut list, &name, &members)?;
    write_child_list(store, parent, &list)?;

    Ok(Registration {
        segment: list.get(to).cloned(),
        renamed,
    })
}

/// Drop a child's entry from the list without renumbering its siblings
///
/// A missing entry is tolerated so a stale index can still be cleaned up.
pub fn unregister_child<S: NodeStore + ?Sized>(
    store: &mut S,
    parent: &Path,
    segment: &Segment,
) -> Result<()> {
    let mut list = read_child_list(store, parent)?;
    let before = list.len();
    list.retain(|s| s != segment);
    if list.len() != before {
        write_child_list(store, parent, &list)?;
    }
    Ok(())
}

/// Rename a child in a store that has no native rename
///
/// A new child is created under `new`, receives every property (identity
/// included), and all grandchildren are re-parented onto it before the old
/// child is removed.
pub fn change_segment<S: NodeStore + ?Sized>(
    store: &mut S,
    parent: &Path,
    existing: &Segment,
    new: &Segment,
) -> Result<()> {
    if existing == new {
        return Ok(());
    }
    tracing::trace!(parent = %parent, from = %existing, to = %new, "renaming child");
    let old_path = parent.child(existing.clone());
    let new_path = parent.child(new.clone());

    store.add_child(parent, new)?;
    let properties = store.properties(&old_path)?;
    store.replace_properties(&new_path, properties)?;
    for grandchild in store.child_segments(&old_path)? {
        store.move_node(&old_path.child(grandchild), &new_path)?;
    }
    store.remove_child(parent, existing)
}

fn position_of(list: &[Segment], parent: &Path, segment: &Segment) -> Result<usize> {
    list.iter().position(|s| s == segment).ok_or_else(|| {
        GraphError::store(
            "child_list",
            format!("{} is not in the child list of {}", segment, parent),
        )
    })
}

/// Entries named `name`, plus the entry at `extra` if given, in list order
fn group_of(list: &[Segment], name: &str, extra: Option<usize>) -> Vec<Member> {
    list.iter()
        .enumerate()
        .filter(|(i, s)| s.name() == name || Some(*i) == extra)
        .map(|(i, s)| Member {
            position: i,
            current: Some(s.clone()),
        })
        .collect()
}

/// Assign segments to a name group and rename the affected children
///
/// Updates `list` in place; the caller persists it.
fn renumber_group<S: NodeStore + ?Sized>(
    store: &mut S,
    parent: &Path,
    list: &mut [Segment],
    name: &str,
    members: &[Member],
) -> Result<Vec<(Segment, Segment)>> {
    let single = members.len() == 1;
    let mut renames = Vec::new();
    for (i, member) in members.iter().enumerate() {
        let target = if single {
            Segment::new(name)
        } else {
            Segment::with_index(name, i as u32 + 1)
        };
        if let Some(current) = &member.current {
            if *current != target {
                renames.push((current.clone(), target.clone()));
            }
        }
        list[member.position] = target;
    }
    apply_renames(store, parent, &renames)?;
    Ok(renames)
}

/// Run renames so that no target is still held by a pending source
///
/// Cycles (only possible after a reorder) are broken by parking one child under
/// an unused index first.
fn apply_renames<S: NodeStore + ?Sized>(
    store: &mut S,
    parent: &Path,
    renames: &[(Segment, Segment)],
) -> Result<()> {
    let mut pending: Vec<(Segment, Segment)> = renames.to_vec();
    while !pending.is_empty() {
        let ready = pending
            .iter()
            .position(|(_, to)| !pending.iter().any(|(from, _)| from == to));
        match ready {
            Some(ix) => {
                let (from, to) = pending.remove(ix);
                change_segment(store, parent, &from, &to)?;
            }
            None => {
                let parked = unused_segment(store, parent, pending[0].0.name())?;
                change_segment(store, parent, &pending[0].0, &parked)?;
                pending[0].0 = parked;
            }
        }
    }
    Ok(())
}

fn unused_segment<S: NodeStore + ?Sized>(store: &S, parent: &Path, name: &str) -> Result<Segment> {
    let highest = store
        .child_segments(parent)?
        .iter()
        .filter(|s| s.name() == name)
        .map(Segment::effective_index)
        .max()
        .unwrap_or(0);
    Ok(Segment::with_index(name, highest + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyValue;
    use crate::ops::MemoryStore;

    fn path(s: &str) -> Path {
        s.parse().unwrap()
    }

    fn seg(s: &str) -> Segment {
        s.parse().unwrap()
    }

    fn segs(list: &[&str]) -> Vec<Segment> {
        list.iter().map(|s| seg(s)).collect()
    }

    /// Register and add a child the way the processor does
    fn create(store: &mut MemoryStore, parent: &Path, name: &str) -> Segment {
        let reg = register_child(store, parent, name, true).unwrap();
        let segment = reg.segment.unwrap();
        store.add_child(parent, &segment).unwrap();
        segment
    }

    fn actual_children(store: &MemoryStore, parent: &Path) -> Vec<Segment> {
        let mut children = store.child_segments(parent).unwrap();
        children.sort();
        children
    }

    #[test]
    fn test_first_child_has_no_index() {
        let mut store = MemoryStore::new();
        assert_eq!(create(&mut store, &Path::root(), "a"), seg("a"));
        assert_eq!(read_child_list(&store, &Path::root()).unwrap(), segs(&["a"]));
    }

    #[test]
    fn test_second_same_name_child_renumbers_first() {
        let mut store = MemoryStore::new();
        create(&mut store, &Path::root(), "x");
        store
            .put_property(&path("/x"), "marker", vec![PropertyValue::from("first")])
            .unwrap();

        let second = create(&mut store, &Path::root(), "x");
        assert_eq!(second, seg("x[2]"));
        assert_eq!(
            read_child_list(&store, &Path::root()).unwrap(),
            segs(&["x[1]", "x[2]"])
        );
        // The first child was renamed with its data intact
        assert!(!store.exists(&path("/x")).unwrap());
        assert_eq!(
            store.property(&path("/x[1]"), "marker").unwrap(),
            Some(vec![PropertyValue::from("first")])
        );
    }

    #[test]
    fn test_rename_carries_grandchildren() {
        let mut store = MemoryStore::new();
        create(&mut store, &Path::root(), "x");
        create(&mut store, &path("/x"), "child");
        create(&mut store, &Path::root(), "x");

        assert!(store.exists(&path("/x[1]/child")).unwrap());
        assert_eq!(
            read_child_list(&store, &path("/x[1]")).unwrap(),
            segs(&["child"])
        );
    }

    #[test]
    fn test_mixed_names_keep_list_order() {
        let mut store = MemoryStore::new();
        for name in ["x", "y", "x", "z", "x"] {
            create(&mut store, &Path::root(), name);
        }
        assert_eq!(
            read_child_list(&store, &Path::root()).unwrap(),
            segs(&["x[1]", "y", "x[2]", "z", "x[3]"])
        );
        assert_eq!(
            actual_children(&store, &Path::root()),
            segs(&["x[1]", "x[2]", "x[3]", "y", "z"])
        );
    }

    #[test]
    fn test_touch_after_unregister_closes_gaps() {
        let mut store = MemoryStore::new();
        for _ in 0..3 {
            create(&mut store, &Path::root(), "x");
        }
        store.remove_child(&Path::root(), &seg("x[2]")).unwrap();
        unregister_child(&mut store, &Path::root(), &seg("x[2]")).unwrap();
        assert_eq!(
            read_child_list(&store, &Path::root()).unwrap(),
            segs(&["x[1]", "x[3]"])
        );

        let reg = register_child(&mut store, &Path::root(), "x", false).unwrap();
        assert_eq!(reg.segment, None);
        assert_eq!(reg.renamed, vec![(seg("x[3]"), seg("x[2]"))]);
        assert_eq!(
            read_child_list(&store, &Path::root()).unwrap(),
            segs(&["x[1]", "x[2]"])
        );
    }

    #[test]
    fn test_rename_child_keeps_position_and_renumbers_both_groups() {
        let mut store = MemoryStore::new();
        for name in ["x", "y", "x", "y"] {
            create(&mut store, &Path::root(), name);
        }
        let reg = rename_child(&mut store, &Path::root(), &seg("x[2]"), "y").unwrap();

        assert_eq!(reg.segment, Some(seg("y[2]")));
        assert_eq!(
            read_child_list(&store, &Path::root()).unwrap(),
            segs(&["x", "y[1]", "y[2]", "y[3]"])
        );
        assert_eq!(
            actual_children(&store, &Path::root()),
            segs(&["x", "y[1]", "y[2]", "y[3]"])
        );
    }

    #[test]
    fn test_reposition_swaps_indices() {
        let mut store = MemoryStore::new();
        create(&mut store, &Path::root(), "x");
        store
            .put_property(&path("/x"), "marker", vec![PropertyValue::from("first")])
            .unwrap();
        create(&mut store, &Path::root(), "x");

        let reg = reposition_child(&mut store, &Path::root(), &seg("x[2]"), Some(&seg("x[1]")))
            .unwrap();

        assert_eq!(reg.segment, Some(seg("x[1]")));
        // The formerly first child now sits second
        assert_eq!(
            store.property(&path("/x[2]"), "marker").unwrap(),
            Some(vec![PropertyValue::from("first")])
        );
        assert_eq!(
            actual_children(&store, &Path::root()),
            segs(&["x[1]", "x[2]"])
        );
    }

    #[test]
    fn test_remap_follows_renamed_ancestor() {
        let reg = Registration {
            segment: Some(seg("y[2]")),
            renamed: vec![(seg("y"), seg("y[1]"))],
        };
        assert_eq!(
            reg.remap(&path("/a"), &path("/a/y/y")),
            path("/a/y[1]/y")
        );
        assert_eq!(reg.remap(&path("/a"), &path("/b/y")), path("/b/y"));
    }

    #[test]
    fn test_last_child_removal_drops_list_property() {
        let mut store = MemoryStore::new();
        create(&mut store, &Path::root(), "a");
        store.remove_child(&Path::root(), &seg("a")).unwrap();
        unregister_child(&mut store, &Path::root(), &seg("a")).unwrap();
        assert_eq!(
            store.property(&Path::root(), CHILD_LIST_PROPERTY).unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_list_is_store_failure() {
        let mut store = MemoryStore::new();
        store
            .put_property(&Path::root(), CHILD_LIST_PROPERTY, vec![PropertyValue::Long(3)])
            .unwrap();
        assert!(matches!(
            read_child_list(&store, &Path::root()),
            Err(GraphError::BackingStore { .. })
        ));
    }
}
