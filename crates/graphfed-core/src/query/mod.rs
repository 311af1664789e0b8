//! Lazy, batched query results over a property index
//!
//! `IndexProvider::filter` only describes the query; the filtering work happens
//! batch by batch in `Results::next_batch`.

pub mod constraint;
pub mod index;
pub mod results;

pub use constraint::Constraint;
pub use index::{IndexEntry, PropertyIndex};
pub use results::{IndexProvider, ResultBatch, Results};
