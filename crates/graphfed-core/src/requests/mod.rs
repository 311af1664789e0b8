//! Command variants accepted by a connection
//!
//! Each request carries its inputs as public fields. Outputs (actual
//! locations, read results, resolved cache policy) are filled in by the
//! processor through checked setters: an actual location must carry a path
//! and, where it answers an input location, denote the same node.

mod change;
mod read;

pub use change::{
    CompositeRequest, CopyBranchRequest, CreateNodeRequest, DeleteBranchRequest,
    MoveBranchRequest, NodeConflictBehavior, RenameNodeRequest, UpdatePropertiesRequest,
};
pub use read::{
    ReadAllChildrenRequest, ReadAllPropertiesRequest, ReadBlockOfChildrenRequest,
    ReadNextBlockOfChildrenRequest, ReadNodeRequest,
};

use crate::errors::{GraphError, Result};
use crate::model::{CachePolicy, Location};

/// One command against a source
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    CreateNode(CreateNodeRequest),
    ReadNode(ReadNodeRequest),
    ReadAllChildren(ReadAllChildrenRequest),
    ReadAllProperties(ReadAllPropertiesRequest),
    ReadBlockOfChildren(ReadBlockOfChildrenRequest),
    ReadNextBlockOfChildren(ReadNextBlockOfChildrenRequest),
    UpdateProperties(UpdatePropertiesRequest),
    RenameNode(RenameNodeRequest),
    CopyBranch(CopyBranchRequest),
    MoveBranch(MoveBranchRequest),
    DeleteBranch(DeleteBranchRequest),
    Composite(CompositeRequest),
}

impl Request {
    /// Fixed per variant; upstream write gating relies on it
    pub fn is_read_only(&self) -> bool {
        match self {
            Request::ReadNode(_)
            | Request::ReadAllChildren(_)
            | Request::ReadAllProperties(_)
            | Request::ReadBlockOfChildren(_)
            | Request::ReadNextBlockOfChildren(_) => true,
            Request::CreateNode(_)
            | Request::UpdateProperties(_)
            | Request::RenameNode(_)
            | Request::CopyBranch(_)
            | Request::MoveBranch(_)
            | Request::DeleteBranch(_) => false,
            Request::Composite(composite) => composite.requests.iter().all(Request::is_read_only),
        }
    }

    /// Operation name used in log events and error context
    pub fn op_name(&self) -> &'static str {
        match self {
            Request::CreateNode(_) => "create_node",
            Request::ReadNode(_) => "read_node",
            Request::ReadAllChildren(_) => "read_all_children",
            Request::ReadAllProperties(_) => "read_all_properties",
            Request::ReadBlockOfChildren(_) => "read_block_of_children",
            Request::ReadNextBlockOfChildren(_) => "read_next_block_of_children",
            Request::UpdateProperties(_) => "update_properties",
            Request::RenameNode(_) => "rename_node",
            Request::CopyBranch(_) => "copy_branch",
            Request::MoveBranch(_) => "move_branch",
            Request::DeleteBranch(_) => "delete_branch",
            Request::Composite(_) => "composite",
        }
    }
}

macro_rules! impl_from_request {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Request {
                fn from(request: $ty) -> Self {
                    Request::$variant(request)
                }
            }

            impl TryFrom<Request> for $ty {
                type Error = Request;

                fn try_from(request: Request) -> std::result::Result<Self, Request> {
                    match request {
                        Request::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_from_request!(
    CreateNode(CreateNodeRequest),
    ReadNode(ReadNodeRequest),
    ReadAllChildren(ReadAllChildrenRequest),
    ReadAllProperties(ReadAllPropertiesRequest),
    ReadBlockOfChildren(ReadBlockOfChildrenRequest),
    ReadNextBlockOfChildren(ReadNextBlockOfChildrenRequest),
    UpdateProperties(UpdatePropertiesRequest),
    RenameNode(RenameNodeRequest),
    CopyBranch(CopyBranchRequest),
    MoveBranch(MoveBranchRequest),
    DeleteBranch(DeleteBranchRequest),
    Composite(CompositeRequest),
);

/// Requested and resolved cache policy of a read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheDirective {
    /// Request-level override, the first candidate of the resolution chain
    pub requested: Option<CachePolicy>,
    resolved: Option<CachePolicy>,
}

impl CacheDirective {
    pub fn requesting(policy: Option<CachePolicy>) -> Self {
        Self {
            requested: policy,
            resolved: None,
        }
    }

    /// Policy in effect for the result; `None` means uncached
    pub fn resolved(&self) -> Option<CachePolicy> {
        self.resolved
    }

    pub fn set_resolved(&mut self, policy: Option<CachePolicy>) {
        self.resolved = policy;
    }
}

/// An actual location must be complete, i.e. carry a path
fn require_complete(argument: &str, actual: &Location) -> Result<()> {
    if actual.has_path() {
        return Ok(());
    }
    Err(GraphError::invalid_argument(
        argument,
        format!("actual location {} has no path", actual),
    ))
}

/// Validate an actual location recorded for `input`
pub(crate) fn require_same(argument: &str, input: &Location, actual: &Location) -> Result<()> {
    require_complete(argument, actual)?;
    if input.is_same(actual) {
        return Ok(());
    }
    Err(GraphError::IdentityMismatch {
        expected: input.clone(),
        actual: Some(actual.clone()),
        reason: format!("{} does not denote the requested node", argument),
    })
}
