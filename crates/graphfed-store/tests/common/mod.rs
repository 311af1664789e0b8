#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use graphfed_core::requests::{
    CreateNodeRequest, DeleteBranchRequest, MoveBranchRequest, ReadAllChildrenRequest,
    ReadAllPropertiesRequest, RenameNodeRequest, Request,
};
use graphfed_core::{
    Connection, ExecutionContext, GraphError, Location, Path, Property, PropertyValue,
    RepositorySource,
};

pub fn path(s: &str) -> Path {
    s.parse().expect("valid path")
}

pub fn loc(s: &str) -> Location {
    Location::at_path(path(s))
}

pub fn execute(
    connection: &mut dyn Connection,
    request: impl Into<Request>,
) -> Result<Request, GraphError> {
    let context = ExecutionContext::new().with_invariant_checks(true);
    let mut request = request.into();
    connection.execute(&context, &mut request)?;
    Ok(request)
}

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

pub fn child_paths(connection: &mut dyn Connection, parent: &str) -> Vec<String> {
    children(connection, parent)
        .iter()
        .map(|c| c.path().expect("complete location").to_string())
        .collect()
}

pub fn property(connection: &mut dyn Connection, at: &str, name: &str) -> Option<Vec<PropertyValue>> {
    match execute(connection, ReadAllPropertiesRequest::new(loc(at))).expect("read properties") {
        Request::ReadAllProperties(r) => r.property(name).map(|p| p.values.clone()),
        other => panic!("unexpected request {:?}", other),
    }
}

/// Drive the same edits through any source and check the engine's guarantees
///
/// Every backend has to give identical observable results.
pub fn run_conformance(source: &dyn RepositorySource) {
    let mut conn = source.connection().unwrap();
    let conn = conn.as_mut();

    // Same-name siblings renumber on the second insert
    create(conn, "/", "a");
    create(conn, "/a", "x");
    let second = create(conn, "/a", "x");
    create(conn, "/a", "x");
    assert_eq!(child_paths(conn, "/a"), vec!["/a/x[1]", "/a/x[2]", "/a/x[3]"]);
    assert_eq!(second.path(), Some(&path("/a/x[2]")));

    // Properties survive renumbering
    execute(
        conn,
        CreateNodeRequest::new(loc("/a"), "y")
            .with_properties(vec![Property::single("title", "Y")]),
    )
    .unwrap();
    execute(conn, RenameNodeRequest::new(loc("/a/x[1]"), "y")).unwrap();
    assert_eq!(
        child_paths(conn, "/a"),
        vec!["/a/y[1]", "/a/x[1]", "/a/x[2]", "/a/y[2]"]
    );
    assert_eq!(
        property(conn, "/a/y[2]", "title"),
        Some(vec![PropertyValue::from("Y")])
    );

    // Delete leaves indices alone
    execute(conn, DeleteBranchRequest::new(loc("/a/x[1]"))).unwrap();
    assert_eq!(child_paths(conn, "/a"), vec!["/a/y[1]", "/a/x[2]", "/a/y[2]"]);

    // Move keeps identity and the moved subtree
    create(conn, "/", "b");
    create(conn, "/a/y[2]", "leaf");
    let moving = children(conn, "/a")[2].clone();
    let moved = execute(conn, MoveBranchRequest::new(loc("/a/y[2]"), loc("/b"))).unwrap();
    let Request::MoveBranch(moved) = moved else {
        panic!("unexpected request");
    };
    let new = moved.actual_new_location().unwrap();
    assert_eq!(new.path(), Some(&path("/b/y")));
    assert_eq!(new.id(), moving.id());
    assert_eq!(child_paths(conn, "/b/y"), vec!["/b/y/leaf"]);
    assert_eq!(child_paths(conn, "/a"), vec!["/a/y[1]", "/a/x[2]"]);
}
