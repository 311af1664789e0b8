#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use graphfed_core::connector::{Connection, MemorySource, RepositorySource, SourceCapabilities};
use graphfed_core::requests::{CreateNodeRequest, ReadAllChildrenRequest, Request};
use graphfed_core::{ExecutionContext, GraphError, Location, Path, SourceSettings};

pub fn path(s: &str) -> Path {
    s.parse().expect("valid path")
}

pub fn loc(s: &str) -> Location {
    Location::at_path(path(s))
}

/// Memory source with every capability on
pub fn memory_source() -> MemorySource {
    memory_source_with(SourceCapabilities::default())
}

pub fn memory_source_with(capabilities: SourceCapabilities) -> MemorySource {
    let settings = SourceSettings::new("test-source")
        .expect("valid settings")
        .with_capabilities(capabilities);
    MemorySource::in_memory(settings)
}

pub fn connect(source: &MemorySource) -> Box<dyn Connection> {
    source.connection().expect("connection")
}

/// Execute one request with invariant checks on and hand it back
pub fn execute(
    connection: &mut dyn Connection,
    request: impl Into<Request>,
) -> Result<Request, GraphError> {
    let context = ExecutionContext::new().with_invariant_checks(true);
    let mut request = request.into();
    connection.execute(&context, &mut request)?;
    Ok(request)
}

/// Create `name` under `parent`, returning the new node's location
pub fn create(connection: &mut dyn Connection, parent: &str, name: &str) -> Location {
    match execute(connection, CreateNodeRequest::new(loc(parent), name)).expect("create") {
        Request::CreateNode(r) => r.actual_location().cloned().expect("actual location"),
        other => panic!("unexpected request {:?}", other),
    }
}

pub fn children(connection: &mut dyn Connection, parent: &str) -> Vec<Location> {
    match execute(connection, ReadAllChildrenRequest::new(loc(parent))).expect("read children") {
        Request::ReadAllChildren(r) => r.children().to_vec(),
        other => panic!("unexpected request {:?}", other),
    }
}

/// Child paths of `parent` as strings, in list order
pub fn child_paths(connection: &mut dyn Connection, parent: &str) -> Vec<String> {
    children(connection, parent)
        .iter()
        .map(|c| c.path().expect("complete location").to_string())
        .collect()
}
