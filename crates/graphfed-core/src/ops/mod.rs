pub mod branch_ops;
pub mod child_list;
pub mod identity;
pub mod memory_store;
pub mod resolve;
pub mod store;

pub use branch_ops::{
    add_registered_child, clear_node, copy_branch, delete_branch, move_branch, rename_node,
    CopyOutcome,
};
pub use child_list::{
    read_child_list, register_child, rename_child, reposition_child, unregister_child,
    write_child_list, Registration,
};
pub use identity::{ensure_identity, read_identity, IdentityPolicy};
pub use memory_store::MemoryStore;
pub use resolve::{find_by_identity, lowest_existing, require_path, resolve_location};
pub use store::NodeStore;
