use super::{require_complete, require_same, Request};
use crate::errors::Result;
use crate::model::{Location, Property};

/// What CreateNode does when the parent already has a child with that name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeConflictBehavior {
    /// Add a same-name sibling
    #[default]
    Append,
    /// Reuse the existing child (identity and position kept) after clearing it
    Replace,
    /// Leave the existing child untouched and report it
    DoNotReplace,
}

/// Create a child of `under` named `name`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateNodeRequest {
    pub under: Location,
    pub name: String,
    pub properties: Vec<Property>,
    pub conflict_behavior: NodeConflictBehavior,
    actual_location: Option<Location>,
}

impl CreateNodeRequest {
    pub fn new(under: Location, name: impl Into<String>) -> Self {
        Self {
            under,
            name: name.into(),
            properties: Vec::new(),
            conflict_behavior: NodeConflictBehavior::default(),
            actual_location: None,
        }
    }

    pub fn with_properties(mut self, properties: Vec<Property>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_conflict_behavior(mut self, behavior: NodeConflictBehavior) -> Self {
        self.conflict_behavior = behavior;
        self
    }

    /// Location of the created (or reused) node
    pub fn actual_location(&self) -> Option<&Location> {
        self.actual_location.as_ref()
    }

    pub fn set_actual_location(&mut self, actual: Location) -> Result<()> {
        require_complete("actual_location", &actual)?;
        self.actual_location = Some(actual);
        Ok(())
    }
}

/// Set or remove properties; an empty value list removes the property
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePropertiesRequest {
    pub on: Location,
    pub properties: Vec<Property>,
    actual_location: Option<Location>,
}

impl UpdatePropertiesRequest {
    pub fn new(on: Location, properties: Vec<Property>) -> Self {
        Self {
            on,
            properties,
            actual_location: None,
        }
    }

    pub fn actual_location(&self) -> Option<&Location> {
        self.actual_location.as_ref()
    }

    pub fn set_actual_location(&mut self, actual: Location) -> Result<()> {
        require_same("on", &self.on, &actual)?;
        self.actual_location = Some(actual);
        Ok(())
    }
}

/// Rename a node in place
#[derive(Debug, Clone, PartialEq)]
pub struct RenameNodeRequest {
    pub at: Location,
    pub new_name: String,
    actual_old_location: Option<Location>,
    actual_new_location: Option<Location>,
}

impl RenameNodeRequest {
    pub fn new(at: Location, new_name: impl Into<String>) -> Self {
        Self {
            at,
            new_name: new_name.into(),
            actual_old_location: None,
            actual_new_location: None,
        }
    }

    pub fn actual_old_location(&self) -> Option<&Location> {
        self.actual_old_location.as_ref()
    }

    pub fn actual_new_location(&self) -> Option<&Location> {
        self.actual_new_location.as_ref()
    }

    pub fn set_actual_locations(&mut self, old: Location, new: Location) -> Result<()> {
        require_same("at", &self.at, &old)?;
        require_complete("actual_new_location", &new)?;
        self.actual_old_location = Some(old);
        self.actual_new_location = Some(new);
        Ok(())
    }
}

/// Copy a branch as the last child of `into`; the copy gets fresh identities
#[derive(Debug, Clone, PartialEq)]
pub struct CopyBranchRequest {
    pub from: Location,
    pub into: Location,
    actual_location_of_original: Option<Location>,
    actual_location_of_copy: Option<Location>,
}

impl CopyBranchRequest {
    pub fn new(from: Location, into: Location) -> Self {
        Self {
            from,
            into,
            actual_location_of_original: None,
            actual_location_of_copy: None,
        }
    }

    /// Where the original was found when the copy ran
    pub fn actual_location_of_original(&self) -> Option<&Location> {
        self.actual_location_of_original.as_ref()
    }

    pub fn actual_location_of_copy(&self) -> Option<&Location> {
        self.actual_location_of_copy.as_ref()
    }

    pub fn set_actual_locations(&mut self, original: Location, copy: Location) -> Result<()> {
        require_same("from", &self.from, &original)?;
        require_complete("actual_location_of_copy", &copy)?;
        self.actual_location_of_original = Some(original);
        self.actual_location_of_copy = Some(copy);
        Ok(())
    }
}

/// Move a branch under `into`, optionally placing it before a sibling
#[derive(Debug, Clone, PartialEq)]
pub struct MoveBranchRequest {
    pub from: Location,
    pub into: Location,
    /// Child of `into` before which the node is placed; last when absent
    pub before: Option<Location>,
    actual_old_location: Option<Location>,
    actual_new_location: Option<Location>,
}

impl MoveBranchRequest {
    pub fn new(from: Location, into: Location) -> Self {
        Self {
            from,
            into,
            before: None,
            actual_old_location: None,
            actual_new_location: None,
        }
    }

    pub fn before(mut self, sibling: Location) -> Self {
        self.before = Some(sibling);
        self
    }

    pub fn actual_old_location(&self) -> Option<&Location> {
        self.actual_old_location.as_ref()
    }

    pub fn actual_new_location(&self) -> Option<&Location> {
        self.actual_new_location.as_ref()
    }

    pub fn set_actual_locations(&mut self, old: Location, new: Location) -> Result<()> {
        require_same("from", &self.from, &old)?;
        require_complete("actual_new_location", &new)?;
        self.actual_old_location = Some(old);
        self.actual_new_location = Some(new);
        Ok(())
    }
}

/// Remove a node and its whole subtree
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteBranchRequest {
    pub at: Location,
    actual_location: Option<Location>,
}

impl DeleteBranchRequest {
    pub fn new(at: Location) -> Self {
        Self {
            at,
            actual_location: None,
        }
    }

    pub fn actual_location(&self) -> Option<&Location> {
        self.actual_location.as_ref()
    }

    pub fn set_actual_location(&mut self, actual: Location) -> Result<()> {
        require_same("at", &self.at, &actual)?;
        self.actual_location = Some(actual);
        Ok(())
    }
}

/// Several requests processed in order, stopping at the first failure
///
/// Requests that completed before a failure stay applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeRequest {
    pub requests: Vec<Request>,
}

impl CompositeRequest {
    pub fn new(requests: Vec<Request>) -> Self {
        Self { requests }
    }

    pub fn push(&mut self, request: impl Into<Request>) {
        self.requests.push(request.into());
    }
}
