/// Scenario 1: Same-name siblings
///
/// Creation order decides indices; the first sibling is renumbered as soon as a
/// second one appears; deletes leave gaps until the name is touched again.
mod common;

use common::{child_paths, children, connect, create, execute, loc, memory_source};
use graphfed_core::requests::{DeleteBranchRequest, RenameNodeRequest, Request};

#[test]
fn test_scenario_01_renumbering_happens_on_second_insert() {
    // GIVEN /a
    let source = memory_source();
    let mut conn = connect(&source);
    create(conn.as_mut(), "/", "a");

    // WHEN x is created once
    let first = create(conn.as_mut(), "/a", "x");
    // THEN it carries no index
    assert_eq!(first.path().unwrap().to_string(), "/a/x");
    assert_eq!(child_paths(conn.as_mut(), "/a"), vec!["/a/x"]);

    // WHEN a second x is created
    let second = create(conn.as_mut(), "/a", "x");
    // THEN the unindexed segment is gone and both are numbered
    assert_eq!(second.path().unwrap().to_string(), "/a/x[2]");
    assert_eq!(child_paths(conn.as_mut(), "/a"), vec!["/a/x[1]", "/a/x[2]"]);

    // WHEN a third x is created
    create(conn.as_mut(), "/a", "x");
    assert_eq!(
        child_paths(conn.as_mut(), "/a"),
        vec!["/a/x[1]", "/a/x[2]", "/a/x[3]"]
    );
}

#[test]
fn test_scenario_01_n_creations_follow_call_order() {
    let source = memory_source();
    let mut conn = connect(&source);

    let mut created = Vec::new();
    for _ in 0..7 {
        created.push(create(conn.as_mut(), "/", "item").id().unwrap());
    }

    let listed = children(conn.as_mut(), "/");
    assert_eq!(listed.len(), 7);
    for (i, child) in listed.iter().enumerate() {
        assert_eq!(child.path().unwrap().to_string(), format!("/item[{}]", i + 1));
        // Identity survives renumbering, so order matches call order
        assert_eq!(child.id(), Some(created[i]));
    }
}

#[test]
fn test_scenario_01_delete_then_touch_closes_gap() {
    // GIVEN four same-named children
    let source = memory_source();
    let mut conn = connect(&source);
    for _ in 0..4 {
        create(conn.as_mut(), "/", "x");
    }

    // WHEN the second one is deleted
    execute(conn.as_mut(), DeleteBranchRequest::new(loc("/x[2]"))).unwrap();
    // THEN survivors keep their indices
    assert_eq!(child_paths(conn.as_mut(), "/"), vec!["/x[1]", "/x[3]", "/x[4]"]);

    // WHEN an unrelated sibling is renamed to x, touching that name
    create(conn.as_mut(), "/", "y");
    let renamed = execute(conn.as_mut(), RenameNodeRequest::new(loc("/y"), "x")).unwrap();

    // THEN the x group is a gap-free run in list order
    assert_eq!(
        child_paths(conn.as_mut(), "/"),
        vec!["/x[1]", "/x[2]", "/x[3]", "/x[4]"]
    );
    match renamed {
        Request::RenameNode(r) => {
            assert_eq!(r.actual_new_location().unwrap().path().unwrap().to_string(), "/x[4]")
        }
        other => panic!("unexpected request {:?}", other),
    }
}

#[test]
fn test_scenario_01_delete_then_create_renumbers_survivors() {
    let source = memory_source();
    let mut conn = connect(&source);
    for _ in 0..3 {
        create(conn.as_mut(), "/", "x");
    }
    execute(conn.as_mut(), DeleteBranchRequest::new(loc("/x[1]"))).unwrap();

    create(conn.as_mut(), "/", "x");

    assert_eq!(child_paths(conn.as_mut(), "/"), vec!["/x[1]", "/x[2]", "/x[3]"]);
}

#[test]
fn test_scenario_01_rename_away_leaves_lone_sibling_unindexed() {
    let source = memory_source();
    let mut conn = connect(&source);
    create(conn.as_mut(), "/", "x");
    create(conn.as_mut(), "/", "x");

    execute(conn.as_mut(), RenameNodeRequest::new(loc("/x[2]"), "z")).unwrap();

    assert_eq!(child_paths(conn.as_mut(), "/"), vec!["/x", "/z"]);
}
