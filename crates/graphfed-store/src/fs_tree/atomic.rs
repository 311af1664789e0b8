use crate::errors::{io_error, Result};
use std::fs;
use std::path::Path;

/// Atomically write bytes to a file
///
/// Writes a sibling temp file, then renames it over the target.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create_node_dir", e))?;
    }

    let temp_path = target_path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|e| io_error("write_props_temp", e))?;
    fs::rename(&temp_path, target_path).map_err(|e| io_error("rename_props_temp", e))?;
    Ok(())
}
