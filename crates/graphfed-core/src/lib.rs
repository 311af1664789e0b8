//! GraphFed Core - connector execution engine of the federation layer
//!
//! This crate exposes heterogeneous backing stores as one path-addressed,
//! identity-stable node graph:
//! - Path/Location model and typed property values
//! - `NodeStore` primitives and an in-memory arena store
//! - Ordered-children index with same-name-sibling renumbering
//! - Node identity assignment (fresh on copy, preserved on move)
//! - Cache policy resolution
//! - Request variants and the `RequestProcessor` that executes them
//! - Source/Connection contract and lazy batched query results

pub mod connector;
pub mod context;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod policy;
pub mod processor;
pub mod query;
pub mod requests;
pub mod rules;

// Re-export commonly used types
pub use connector::{
    ChangeEvent, Connection, MemorySource, RepositorySource, SourceCapabilities, SourceListener,
    SourceSettings, StoreSource,
};
pub use context::ExecutionContext;
pub use errors::{ExError, ExErrorKind, GraphError, Result};
pub use model::{CachePolicy, Location, NodeId, Path, Property, PropertyValue, Segment};
pub use ops::{MemoryStore, NodeStore};
pub use processor::RequestProcessor;
pub use requests::Request;
