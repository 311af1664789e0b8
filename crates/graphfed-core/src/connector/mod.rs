//! Source and connection contract plus a store-backed implementation

pub mod listener;
pub mod settings;
pub mod source;
pub mod store_source;

pub use listener::{ChangeEvent, SourceListener};
pub use settings::{SourceCapabilities, SourceSettings};
pub use source::{Connection, RepositorySource};
pub use store_source::{MemorySource, StoreConnection, StoreSource};
