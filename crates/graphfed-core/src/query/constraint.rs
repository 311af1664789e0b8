use crate::model::{Path, PropertyValue};

use super::index::IndexEntry;

/// One term of a conjunctive filter
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Some value of the property equals `value`
    PropertyEquals { name: String, value: PropertyValue },
    PropertyExists { name: String },
    /// The node's name (index ignored)
    NameEquals(String),
    /// Strictly below `ancestor`
    DescendantOf(Path),
    /// Case-insensitive term found in the node name or any string value
    FullText(String),
}

impl Constraint {
    /// Score of `entry` for this term; `None` when it does not match
    ///
    /// Full-text terms score the number of occurrences, all others 1.0.
    pub fn score(&self, entry: &IndexEntry) -> Option<f32> {
        let matched = match self {
            Constraint::PropertyEquals { name, value } => entry
                .properties
                .get(name)
                .is_some_and(|values| values.contains(value)),
            Constraint::PropertyExists { name } => entry.properties.contains_key(name),
            Constraint::NameEquals(name) => entry
                .path
                .last_segment()
                .is_some_and(|s| s.name() == name),
            Constraint::DescendantOf(ancestor) => ancestor.is_ancestor_of(&entry.path),
            Constraint::FullText(term) => {
                let hits = occurrences(entry, term);
                return (hits > 0).then_some(hits as f32);
            }
        };
        matched.then_some(1.0)
    }
}

fn occurrences(entry: &IndexEntry, term: &str) -> usize {
    let term = term.to_lowercase();
    if term.is_empty() {
        return 0;
    }
    let count = |text: &str| text.to_lowercase().matches(term.as_str()).count();

    let in_name = entry
        .path
        .last_segment()
        .map(|s| count(s.name()))
        .unwrap_or(0);
    let in_values: usize = entry
        .properties
        .values()
        .flatten()
        .filter_map(PropertyValue::as_str)
        .map(count)
        .sum();
    in_name + in_values
}

/// Combined score of a conjunction; an empty conjunction matches everything
pub fn score_all(constraints: &[Constraint], entry: &IndexEntry) -> Option<f32> {
    constraints
        .iter()
        .try_fold(1.0_f32, |acc, c| c.score(entry).map(|s| acc * s))
}
