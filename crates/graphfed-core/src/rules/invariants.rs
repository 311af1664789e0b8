use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::errors::{GraphError, Result};
use crate::model::{Path, Segment};
use crate::ops::{read_child_list, NodeStore};

/// One way a parent's ordered child list can disagree with its real children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildListViolation {
    LengthMismatch { listed: usize, actual: usize },
    /// An actual child missing from the list
    Unlisted(Segment),
    /// A list entry with no actual child behind it
    Dangling(Segment),
    Duplicate(Segment),
    /// Indices of a repeated name are not `1..=k` in list order
    IndexRun { name: String, indices: Vec<Option<u32>> },
    /// The only child with its name carries an index
    LoneIndexed(Segment),
}

impl ChildListViolation {
    /// Violations that even a lazily renumbered list (after deletes) must not have
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            ChildListViolation::IndexRun { .. } | ChildListViolation::LoneIndexed(_)
        )
    }

    /// Sibling name whose numbering is at fault, for index violations
    pub fn group_name(&self) -> Option<&str> {
        match self {
            ChildListViolation::IndexRun { name, .. } => Some(name),
            ChildListViolation::LoneIndexed(segment) => Some(segment.name()),
            _ => None,
        }
    }
}

impl fmt::Display for ChildListViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildListViolation::LengthMismatch { listed, actual } => {
                write!(f, "{} entries listed for {} children", listed, actual)
            }
            ChildListViolation::Unlisted(s) => write!(f, "child {} is not listed", s),
            ChildListViolation::Dangling(s) => write!(f, "entry {} has no child", s),
            ChildListViolation::Duplicate(s) => write!(f, "entry {} is listed twice", s),
            ChildListViolation::IndexRun { name, indices } => {
                write!(f, "indices of '{}' are {:?}", name, indices)
            }
            ChildListViolation::LoneIndexed(s) => write!(f, "lone child {} carries an index", s),
        }
    }
}

/// Compare a parent's child list with its actual children
pub fn find_child_list_violations<S: NodeStore + ?Sized>(
    store: &S,
    parent: &Path,
) -> Result<Vec<ChildListViolation>> {
    let listed = read_child_list(store, parent)?;
    let actual: HashSet<Segment> = store.child_segments(parent)?.into_iter().collect();
    let mut violations = Vec::new();

    if listed.len() != actual.len() {
        violations.push(ChildListViolation::LengthMismatch {
            listed: listed.len(),
            actual: actual.len(),
        });
    }

    let mut seen = HashSet::new();
    for segment in &listed {
        if !seen.insert(segment) {
            violations.push(ChildListViolation::Duplicate(segment.clone()));
        }
        if !actual.contains(segment) {
            violations.push(ChildListViolation::Dangling(segment.clone()));
        }
    }
    let mut unlisted: Vec<&Segment> = actual.iter().filter(|s| !seen.contains(s)).collect();
    unlisted.sort();
    violations.extend(
        unlisted
            .into_iter()
            .map(|s| ChildListViolation::Unlisted(s.clone())),
    );

    let mut groups: BTreeMap<&str, Vec<&Segment>> = BTreeMap::new();
    for segment in &listed {
        groups.entry(segment.name()).or_default().push(segment);
    }
    for (name, members) in groups {
        if members.len() == 1 {
            if members[0].has_index() {
                violations.push(ChildListViolation::LoneIndexed(members[0].clone()));
            }
            continue;
        }
        let indices: Vec<Option<u32>> = members.iter().map(|s| s.index()).collect();
        let gap_free = indices
            .iter()
            .enumerate()
            .all(|(i, index)| *index == Some(i as u32 + 1));
        if !gap_free {
            violations.push(ChildListViolation::IndexRun {
                name: name.to_string(),
                indices,
            });
        }
    }
    Ok(violations)
}

/// Fail with `Internal` if the parent's child list breaks the index invariant
///
/// Structural violations always count. Numbering is only checked for the names
/// in `touched`: siblings of a deleted node keep their indices until their name
/// is touched again.
pub fn verify_child_list<S: NodeStore + ?Sized>(
    store: &S,
    parent: &Path,
    touched: &[&str],
) -> Result<()> {
    let violations: Vec<String> = find_child_list_violations(store, parent)?
        .into_iter()
        .filter(|v| {
            v.is_structural() || v.group_name().is_some_and(|name| touched.contains(&name))
        })
        .map(|v| v.to_string())
        .collect();
    if violations.is_empty() {
        return Ok(());
    }
    Err(GraphError::Internal {
        message: format!(
            "child list of {} is inconsistent: {}",
            parent,
            violations.join("; ")
        ),
    })
}

/// Check every parent in the subtree rooted at `root`
pub fn find_subtree_violations<S: NodeStore + ?Sized>(
    store: &S,
    root: &Path,
) -> Result<Vec<(Path, ChildListViolation)>> {
    let mut found = Vec::new();
    let mut pending = vec![root.clone()];
    while let Some(parent) = pending.pop() {
        for violation in find_child_list_violations(store, &parent)? {
            found.push((parent.clone(), violation));
        }
        for segment in store.child_segments(&parent)? {
            pending.push(parent.child(segment));
        }
    }
    Ok(found)
}
