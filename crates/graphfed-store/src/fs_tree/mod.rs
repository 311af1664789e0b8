//! Filesystem-tree node store
//!
//! Every node is a directory; the root node is the configured root directory.
//! Properties live in a JSON sidecar file inside the node's directory, written
//! with the temp→rename pattern so a crash never leaves a partial file.

mod atomic;
mod naming;
mod store;

pub use atomic::atomic_write;
pub use naming::{decode_segment, encode_segment};
pub use store::{FsNodeStore, PROPERTIES_FILE};
