use std::sync::Arc;

use super::constraint::{score_all, Constraint};
use super::index::IndexEntry;
use crate::errors::{GraphError, Result};
use crate::model::NodeId;

/// Something that can answer constraint filters
pub trait IndexProvider {
    /// Describe a query; must return immediately without filtering anything
    ///
    /// `cardinality_estimate` is a planner hint, not a limit.
    fn filter(&self, constraints: Vec<Constraint>, cardinality_estimate: u64) -> Box<dyn Results>;
}

/// Lazily evaluated results, consumed in order by a single caller
pub trait Results: Send {
    /// Filter the next batch of at most `batch_size` matches
    ///
    /// # Errors
    /// `ArgumentValidation` if `batch_size` is zero
    fn next_batch(&mut self, batch_size: usize) -> Result<ResultBatch>;

    /// Release resources; safe to call repeatedly, or before any batch
    fn close(&mut self);
}

/// Node keys paired with relevance scores
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBatch {
    keys: Vec<NodeId>,
    scores: Vec<f32>,
    has_more: bool,
}

impl ResultBatch {
    pub fn empty() -> Self {
        Self {
            keys: Vec::new(),
            scores: Vec::new(),
            has_more: false,
        }
    }

    fn from_pairs(pairs: Vec<(NodeId, f32)>, has_more: bool) -> Self {
        let (keys, scores) = pairs.into_iter().unzip();
        Self {
            keys,
            scores,
            has_more,
        }
    }

    pub fn keys(&self) -> &[NodeId] {
        &self.keys
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn size(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f32)> + '_ {
        self.keys.iter().copied().zip(self.scores.iter().copied())
    }
}

/// Results scanning a shared index snapshot on demand
pub(crate) struct LazyResults {
    entries: Option<Arc<[IndexEntry]>>,
    constraints: Vec<Constraint>,
    cardinality_estimate: u64,
    cursor: usize,
    /// First match of the next batch, found while computing `has_more`
    lookahead: Option<(NodeId, f32)>,
}

impl LazyResults {
    pub(crate) fn new(
        entries: Arc<[IndexEntry]>,
        constraints: Vec<Constraint>,
        cardinality_estimate: u64,
    ) -> Self {
        Self {
            entries: Some(entries),
            constraints,
            cardinality_estimate,
            cursor: 0,
            lookahead: None,
        }
    }

    fn next_match(&mut self, entries: &[IndexEntry]) -> Option<(NodeId, f32)> {
        if let Some(found) = self.lookahead.take() {
            return Some(found);
        }
        while let Some(entry) = entries.get(self.cursor) {
            self.cursor += 1;
            if let Some(score) = score_all(&self.constraints, entry) {
                return Some((entry.key, score));
            }
        }
        None
    }
}

impl Results for LazyResults {
    fn next_batch(&mut self, batch_size: usize) -> Result<ResultBatch> {
        if batch_size == 0 {
            return Err(GraphError::invalid_argument(
                "batch_size",
                "must be positive",
            ));
        }
        let Some(entries) = self.entries.clone() else {
            return Ok(ResultBatch::empty());
        };

        let capacity = batch_size.min(self.cardinality_estimate.max(1) as usize);
        let mut pairs = Vec::with_capacity(capacity);
        while pairs.len() < batch_size {
            match self.next_match(&entries) {
                Some(found) => pairs.push(found),
                None => break,
            }
        }
        self.lookahead = self.next_match(&entries);
        let has_more = self.lookahead.is_some();

        tracing::debug!(batch_size = pairs.len(), has_more, "filtered result batch");
        Ok(ResultBatch::from_pairs(pairs, has_more))
    }

    fn close(&mut self) {
        self.entries = None;
        self.lookahead = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PropertyMap, PropertyValue};

    fn entries(count: usize) -> Arc<[IndexEntry]> {
        (0..count)
            .map(|i| {
                let mut properties = PropertyMap::new();
                let parity = if i % 2 == 0 { "even" } else { "odd" };
                properties.insert("parity".to_string(), vec![PropertyValue::from(parity)]);
                IndexEntry {
                    key: NodeId::generate(),
                    path: format!("/n{}", i).parse().unwrap(),
                    properties,
                }
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn even() -> Vec<Constraint> {
        vec![Constraint::PropertyEquals {
            name: "parity".into(),
            value: "even".into(),
        }]
    }

    #[test]
    fn test_no_matches_first_batch_is_final() {
        let mut results = LazyResults::new(entries(4), vec![Constraint::NameEquals("zz".into())], 0);
        let batch = results.next_batch(10).unwrap();
        assert_eq!(batch.size(), 0);
        assert!(!batch.has_more());
    }

    #[test]
    fn test_has_more_is_exact_at_boundary() {
        // Exactly two even entries out of four
        let mut results = LazyResults::new(entries(4), even(), 2);
        let batch = results.next_batch(2).unwrap();
        assert_eq!(batch.size(), 2);
        assert!(!batch.has_more());
    }

    #[test]
    fn test_batches_in_order_without_loss() {
        let all = entries(10);
        let expected: Vec<NodeId> = all.iter().step_by(2).map(|e| e.key).collect();
        let mut results = LazyResults::new(all, even(), 5);

        let mut seen = Vec::new();
        loop {
            let batch = results.next_batch(2).unwrap();
            assert_eq!(batch.keys().len(), batch.scores().len());
            seen.extend_from_slice(batch.keys());
            if !batch.has_more() {
                break;
            }
        }
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut results = LazyResults::new(entries(1), Vec::new(), 1);
        assert!(matches!(
            results.next_batch(0),
            Err(GraphError::ArgumentValidation { .. })
        ));
    }

    #[test]
    fn test_close_is_idempotent_and_empties() {
        let mut results = LazyResults::new(entries(3), Vec::new(), 3);
        results.close();
        results.close();
        let batch = results.next_batch(5).unwrap();
        assert!(batch.is_empty());
        assert!(!batch.has_more());
    }
}
