//! GraphFed Store - persistent backing stores and source configuration
//!
//! Provides:
//! - SQLite node store with an embedded, checksummed migrations framework
//! - Filesystem-tree node store (directories as nodes, JSON property sidecars)
//! - `SourceConfig` loaded from TOML and the `build_source` factory

pub mod config;
pub mod db;
pub mod errors;
pub mod fs_tree;
pub mod migrations;
pub mod sqlite_store;

// Re-export key types
pub use config::{build_source, Backend, SourceConfig};
pub use fs_tree::FsNodeStore;
pub use sqlite_store::SqliteNodeStore;
