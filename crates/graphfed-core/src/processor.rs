//! Request processor
//!
//! Runs every command variant against a [`NodeStore`]: resolves input
//! locations, maintains the ordered-children index for structural edits,
//! assigns identities, resolves the cache policy of reads and writes the
//! actual locations back onto the request.
//!
//! ## Logging Ownership
//!
//! The processor owns lifecycle logging: `log_op_start!` and exactly one of
//! `log_op_end!` / `log_op_error!` per request, nested requests included.

use std::time::Instant;

use crate::connector::{ChangeEvent, SourceSettings};
use crate::context::ExecutionContext;
use crate::errors::{GraphError, Result};
use crate::model::{
    validate_name, Location, NodeId, Path, Property, Segment, CHILD_LIST_PROPERTY,
};
use crate::ops::{
    add_registered_child, clear_node, copy_branch, delete_branch, ensure_identity, move_branch,
    read_child_list, read_identity, rename_node, resolve_location, IdentityPolicy, NodeStore,
};
use crate::policy::CachePolicyChain;
use crate::requests::{
    require_same, CacheDirective, CompositeRequest, CopyBranchRequest, CreateNodeRequest,
    DeleteBranchRequest, MoveBranchRequest, NodeConflictBehavior, ReadAllChildrenRequest,
    ReadAllPropertiesRequest, ReadBlockOfChildrenRequest, ReadNextBlockOfChildrenRequest,
    ReadNodeRequest, RenameNodeRequest, Request, UpdatePropertiesRequest,
};
use crate::rules::invariants::verify_child_list;
use crate::{log_op_end, log_op_error, log_op_start};

/// Executes requests against one store on behalf of one source
///
/// Changes made by successful requests are collected as [`ChangeEvent`]s;
/// the connection decides whether to deliver them.
pub struct RequestProcessor<'a, S: NodeStore + ?Sized> {
    store: &'a mut S,
    settings: &'a SourceSettings,
    context: &'a ExecutionContext,
    events: Vec<ChangeEvent>,
}

impl<'a, S: NodeStore + ?Sized> RequestProcessor<'a, S> {
    pub fn new(store: &'a mut S, settings: &'a SourceSettings, context: &'a ExecutionContext) -> Self {
        Self {
            store,
            settings,
            context,
            events: Vec::new(),
        }
    }

    /// Events recorded so far
    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ChangeEvent> {
        self.events
    }

    /// Process one request, filling in its outputs
    ///
    /// # Errors
    /// * `UnsupportedOperation` - a change against a source without updates,
    ///   or a capability the command needs is missing
    /// * `PathNotFound`, `ArgumentValidation`, `IdentityMismatch`,
    ///   `BackingStore`, `MoveLeftCopy` - see the individual commands
    pub fn process(&mut self, request: &mut Request) -> Result<()> {
        let op = request.op_name();
        let request_id = self.context.request().request_id.as_str().to_string();
        log_op_start!(op, request_id = %request_id, source = self.settings.name());
        let start = Instant::now();

        let result = self.dispatch(request);

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => {
                log_op_end!(op, duration_ms = duration_ms, request_id = %request_id);
            }
            Err(err) => {
                log_op_error!(op, err.clone(), duration_ms = duration_ms, request_id = %request_id);
            }
        }
        result
    }

    fn dispatch(&mut self, request: &mut Request) -> Result<()> {
        if !request.is_read_only() && !self.settings.capabilities().updates {
            return Err(self.unsupported(request.op_name()));
        }
        match request {
            Request::CreateNode(r) => self.create_node(r),
            Request::ReadNode(r) => self.read_node(r),
            Request::ReadAllChildren(r) => self.read_all_children(r),
            Request::ReadAllProperties(r) => self.read_all_properties(r),
            Request::ReadBlockOfChildren(r) => self.read_block_of_children(r),
            Request::ReadNextBlockOfChildren(r) => self.read_next_block_of_children(r),
            Request::UpdateProperties(r) => self.update_properties(r),
            Request::RenameNode(r) => self.rename(r),
            Request::CopyBranch(r) => self.copy(r),
            Request::MoveBranch(r) => self.move_branch(r),
            Request::DeleteBranch(r) => self.delete(r),
            Request::Composite(r) => self.composite(r),
        }
    }

    // ---------- reads ----------

    fn read_node(&mut self, request: &mut ReadNodeRequest) -> Result<()> {
        let path = self.resolve(&request.at)?;
        let actual = self.locate(&path)?;
        request.set_actual_location(actual)?;
        let properties = self.visible_properties(&path)?;
        let children = self.children_of(&path, read_child_list(&*self.store, &path)?)?;
        request.set_results(properties, children);
        self.resolve_cache(&mut request.cache);
        Ok(())
    }

    fn read_all_children(&mut self, request: &mut ReadAllChildrenRequest) -> Result<()> {
        let path = self.resolve(&request.of)?;
        let actual = self.locate(&path)?;
        request.set_actual_location(actual)?;
        let children = self.children_of(&path, read_child_list(&*self.store, &path)?)?;
        request.set_children(children);
        self.resolve_cache(&mut request.cache);
        Ok(())
    }

    fn read_all_properties(&mut self, request: &mut ReadAllPropertiesRequest) -> Result<()> {
        let path = self.resolve(&request.of)?;
        let actual = self.locate(&path)?;
        request.set_actual_location(actual)?;
        let properties = self.visible_properties(&path)?;
        request.set_properties(properties);
        self.resolve_cache(&mut request.cache);
        Ok(())
    }

    fn read_block_of_children(&mut self, request: &mut ReadBlockOfChildrenRequest) -> Result<()> {
        let path = self.resolve(&request.of)?;
        let actual = self.locate(&path)?;
        request.set_actual_location(actual)?;
        let block: Vec<Segment> = read_child_list(&*self.store, &path)?
            .into_iter()
            .skip(request.starting_index)
            .take(request.count)
            .collect();
        let children = self.children_of(&path, block)?;
        request.set_children(children);
        self.resolve_cache(&mut request.cache);
        Ok(())
    }

    fn read_next_block_of_children(
        &mut self,
        request: &mut ReadNextBlockOfChildrenRequest,
    ) -> Result<()> {
        let anchor = self.resolve(&request.starting_after)?;
        let (parent, anchor_segment) = split(&anchor, "starting_after", "the root has no siblings")?;

        let list = read_child_list(&*self.store, &parent)?;
        let position = list
            .iter()
            .position(|s| *s == anchor_segment)
            .ok_or_else(|| GraphError::IdentityMismatch {
                expected: request.starting_after.clone(),
                actual: None,
                reason: format!("{} is not listed among the children of {}", anchor_segment, parent),
            })?;
        let actual = self.locate(&anchor)?;
        request.set_actual_location_of_starting_after(actual)?;

        let block: Vec<Segment> = list
            .into_iter()
            .skip(position + 1)
            .take(request.count)
            .collect();
        let children = self.children_of(&parent, block)?;
        request.set_children(children);
        self.resolve_cache(&mut request.cache);
        Ok(())
    }

    // ---------- changes ----------

    fn create_node(&mut self, request: &mut CreateNodeRequest) -> Result<()> {
        let parent = self.resolve(&request.under)?;
        validate_name("name", &request.name)?;

        let existing = read_child_list(&*self.store, &parent)?
            .into_iter()
            .find(|s| s.name() == request.name);

        let name = request.name.clone();
        let mut touched = Some(name.as_str());
        let path = match (existing, request.conflict_behavior) {
            (Some(segment), NodeConflictBehavior::DoNotReplace) => {
                let actual = self.locate(&parent.child(segment))?;
                return request.set_actual_location(actual);
            }
            (Some(segment), NodeConflictBehavior::Replace) => {
                let path = parent.child(segment);
                clear_node(&mut *self.store, &path)?;
                touched = None;
                path
            }
            (Some(_), NodeConflictBehavior::Append) if !self.settings.capabilities().same_name_siblings => {
                return Err(self.unsupported("same-name siblings"));
            }
            _ => {
                let siblings = self.snapshot(&parent)?;
                let (path, _) = add_registered_child(&mut *self.store, &parent, &request.name)?;
                self.record_renames(&parent, &siblings, None)?;
                path
            }
        };

        let actual = self.locate(&path)?;
        self.apply_properties(&path, &request.properties)?;
        request.set_actual_location(actual.clone())?;
        self.check_index(&parent, touched.as_slice())?;
        self.events.push(ChangeEvent::Created { location: actual });
        Ok(())
    }

    fn update_properties(&mut self, request: &mut UpdatePropertiesRequest) -> Result<()> {
        let path = self.resolve(&request.on)?;
        let actual = self.locate(&path)?;
        request.set_actual_location(actual.clone())?;
        self.apply_properties(&path, &request.properties)?;
        self.events
            .push(ChangeEvent::PropertiesUpdated { location: actual });
        Ok(())
    }

    fn rename(&mut self, request: &mut RenameNodeRequest) -> Result<()> {
        let path = self.resolve(&request.at)?;
        let (parent, segment) = split(&path, "at", "the root cannot be renamed")?;
        validate_name("new_name", &request.new_name)?;
        if segment.name() != request.new_name {
            self.require_sns_free(&parent, &request.new_name, None)?;
        }

        let id = ensure_identity(&mut *self.store, &path)?;
        require_same("at", &request.at, &Location::new(path.clone(), id))?;
        let siblings = self.snapshot(&parent)?;
        let (new_path, _) = rename_node(&mut *self.store, &path, &request.new_name)?;
        request.set_actual_locations(
            Location::new(path.clone(), id),
            Location::new(new_path.clone(), id),
        )?;

        self.record_renames(&parent, &siblings, Some(id))?;
        if segment.name() != request.new_name {
            self.check_index(&parent, &[segment.name(), request.new_name.as_str()])?;
        }
        if path != new_path {
            self.events.push(ChangeEvent::Renamed {
                from: path,
                to: new_path,
            });
        }
        Ok(())
    }

    fn copy(&mut self, request: &mut CopyBranchRequest) -> Result<()> {
        let from = self.resolve(&request.from)?;
        let into = self.resolve(&request.into)?;
        let (_, segment) = split(&from, "from", "the root cannot be copied")?;
        self.require_sns_free(&into, segment.name(), None)?;

        let original_id = ensure_identity(&mut *self.store, &from)?;
        let original = Location::new(from.clone(), original_id);
        require_same("from", &request.from, &original)?;

        let siblings = self.snapshot(&into)?;
        let outcome = copy_branch(&mut *self.store, &from, &into, IdentityPolicy::Fresh)?;
        let copy = self.locate(&outcome.copy)?;
        request.set_actual_locations(original.clone(), copy.clone())?;

        self.record_renames(&into, &siblings, None)?;
        self.check_index(&into, &[segment.name()])?;
        self.events.push(ChangeEvent::Copied { original, copy });
        Ok(())
    }

    fn move_branch(&mut self, request: &mut MoveBranchRequest) -> Result<()> {
        if request.before.is_some() && !self.settings.capabilities().reordering {
            return Err(self.unsupported("reordering"));
        }
        let from = self.resolve(&request.from)?;
        let into = self.resolve(&request.into)?;
        let before = match &request.before {
            Some(location) => Some(self.resolve(location)?),
            None => None,
        };
        let (_, segment) = split(&from, "from", "the root cannot be moved")?;
        self.require_sns_free(&into, segment.name(), Some(&from))?;

        let id = ensure_identity(&mut *self.store, &from)?;
        let old = Location::new(from.clone(), id);
        require_same("from", &request.from, &old)?;

        let siblings = self.snapshot(&into)?;
        let outcome = move_branch(&mut *self.store, &from, &into, before.as_ref())?;
        let new = Location::new(outcome.copy.clone(), id);
        request.set_actual_locations(old, new.clone())?;

        self.record_renames(&into, &siblings, Some(id))?;
        self.check_index(&into, &[segment.name()])?;
        // Renumbering at the destination may have renamed an ancestor of the source
        if let Some(old_parent) = outcome.original.parent().filter(|p| *p != into) {
            self.check_index(&old_parent, &[])?;
        }
        self.events.push(ChangeEvent::Moved { from, to: new });
        Ok(())
    }

    fn delete(&mut self, request: &mut DeleteBranchRequest) -> Result<()> {
        let path = self.resolve(&request.at)?;
        let (parent, _) = split(&path, "at", "the root cannot be deleted")?;
        let actual = location_of(path.clone(), read_identity(&*self.store, &path)?);
        request.set_actual_location(actual.clone())?;

        delete_branch(&mut *self.store, &path)?;
        self.check_index(&parent, &[])?;
        self.events.push(ChangeEvent::Deleted { location: actual });
        Ok(())
    }

    fn composite(&mut self, request: &mut CompositeRequest) -> Result<()> {
        for inner in request.requests.iter_mut() {
            self.process(inner)?;
        }
        Ok(())
    }

    // ---------- helpers ----------

    fn resolve(&self, location: &Location) -> Result<Path> {
        resolve_location(&*self.store, location)
    }

    /// Complete location of an existing node, assigning an identity if needed
    fn locate(&mut self, path: &Path) -> Result<Location> {
        let id = ensure_identity(&mut *self.store, path)?;
        Ok(Location::new(path.clone(), id))
    }

    fn children_of(&mut self, parent: &Path, segments: Vec<Segment>) -> Result<Vec<Location>> {
        segments
            .into_iter()
            .map(|segment| self.locate(&parent.child(segment)))
            .collect()
    }

    fn visible_properties(&self, path: &Path) -> Result<Vec<Property>> {
        Ok(self
            .store
            .properties(path)?
            .into_iter()
            .filter(|(name, _)| name != CHILD_LIST_PROPERTY)
            .map(|(name, values)| Property::new(name, values))
            .collect())
    }

    /// Store or remove properties; reserved properties are silently skipped
    fn apply_properties(&mut self, path: &Path, properties: &[Property]) -> Result<()> {
        for property in properties {
            if property.is_reserved() {
                tracing::debug!(path = %path, property = %property.name, "ignoring reserved property");
                continue;
            }
            if property.is_empty() {
                self.store.remove_property(path, &property.name)?;
            } else {
                self.store
                    .put_property(path, &property.name, property.values.clone())?;
            }
        }
        Ok(())
    }

    fn resolve_cache(&self, cache: &mut CacheDirective) {
        let chain = CachePolicyChain {
            request: cache.requested,
            connection: self.settings.default_cache_policy(),
            context: self.context.default_cache_policy(),
        };
        cache.set_resolved(chain.resolve());
    }

    /// Reject a second child called `name` under `parent` when the source
    /// cannot hold same-name siblings; `moving` is not counted
    fn require_sns_free(&self, parent: &Path, name: &str, moving: Option<&Path>) -> Result<()> {
        if self.settings.capabilities().same_name_siblings {
            return Ok(());
        }
        let taken = read_child_list(&*self.store, parent)?
            .into_iter()
            .any(|s| s.name() == name && moving != Some(&parent.child(s.clone())));
        if taken {
            return Err(self.unsupported("same-name siblings"));
        }
        Ok(())
    }

    /// Identities of `parent`'s children paired with their current segments
    fn snapshot(&mut self, parent: &Path) -> Result<Vec<(NodeId, Segment)>> {
        let mut children = Vec::new();
        for segment in read_child_list(&*self.store, parent)? {
            let id = ensure_identity(&mut *self.store, &parent.child(segment.clone()))?;
            children.push((id, segment));
        }
        Ok(children)
    }

    /// Record a rename for each child of `parent` whose segment changed since
    /// `before` was taken; the node carrying `skip` is left out
    fn record_renames(
        &mut self,
        parent: &Path,
        before: &[(NodeId, Segment)],
        skip: Option<NodeId>,
    ) -> Result<()> {
        for segment in read_child_list(&*self.store, parent)? {
            let path = parent.child(segment.clone());
            let Some(id) = read_identity(&*self.store, &path)? else {
                continue;
            };
            if Some(id) == skip {
                continue;
            }
            if let Some((_, old)) = before.iter().find(|(known, _)| *known == id) {
                if *old != segment {
                    self.events.push(ChangeEvent::Renamed {
                        from: parent.child(old.clone()),
                        to: path,
                    });
                }
            }
        }
        Ok(())
    }

    /// Verify `parent`'s child list, checking numbering of the `touched` names
    fn check_index(&self, parent: &Path, touched: &[&str]) -> Result<()> {
        if !self.context.verify_invariants() {
            return Ok(());
        }
        verify_child_list(&*self.store, parent, touched)
    }

    fn unsupported(&self, operation: &str) -> GraphError {
        GraphError::unsupported(self.settings.name(), operation)
    }
}

fn split(path: &Path, argument: &str, root_reason: &str) -> Result<(Path, Segment)> {
    match (path.parent(), path.last_segment()) {
        (Some(parent), Some(segment)) => Ok((parent, segment.clone())),
        _ => Err(GraphError::invalid_argument(argument, root_reason)),
    }
}

fn location_of(path: Path, id: Option<NodeId>) -> Location {
    match id {
        Some(id) => Location::new(path, id),
        None => Location::at_path(path),
    }
}
