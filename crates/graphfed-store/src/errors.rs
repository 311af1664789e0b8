//! Error helpers for graphfed-store
//!
//! Store failures surface as `GraphError` so they flow through the engine
//! unchanged; the `op` names which layer failed.

use graphfed_core::errors::GraphError;

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> GraphError {
    GraphError::store(
        "migration",
        format!("Migration {} failed: {}", migration_id, reason),
    )
}

/// Create a checksum mismatch error for an already applied migration
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> GraphError {
    GraphError::store(
        "migration_checksum",
        format!(
            "Checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ),
    )
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> GraphError {
    GraphError::store("sqlite", err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> GraphError {
    GraphError::store(operation, err.to_string())
}

/// Create a configuration error
pub fn config_error(reason: impl Into<String>) -> GraphError {
    GraphError::invalid_argument("config", reason)
}
