//! CLI structural command tests
//!
//! Each test drives the built binary against a fresh SQLite graph in a temp
//! directory; state persists between invocations.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{graphfed_err, graphfed_ok, id_of, path_of};
use tempfile::TempDir;

#[test]
fn test_cli_create_renumbers_same_name_siblings() {
    // GIVEN an empty graph
    let temp = TempDir::new().unwrap();

    // WHEN two children named x are created under the root
    let first = graphfed_ok(&temp, &["create", "/", "x"]);
    let second = graphfed_ok(&temp, &["create", "/", "x"]);

    // THEN the first answer is unindexed, the second is x[2], and listing shows both indexed
    assert_eq!(path_of(&first[0]), "/x");
    assert_eq!(path_of(&second[0]), "/x[2]");
    assert_eq!(graphfed_ok(&temp, &["ls", "/"]), vec!["/x[1]", "/x[2]"]);
}

#[test]
fn test_cli_create_keep_returns_existing_node() {
    let temp = TempDir::new().unwrap();
    let created = graphfed_ok(&temp, &["create", "/", "doc"]);

    let kept = graphfed_ok(&temp, &["create", "/", "doc", "--on-conflict", "keep"]);

    assert_eq!(kept, created);
    assert_eq!(graphfed_ok(&temp, &["ls", "/"]), vec!["/doc"]);
}

#[test]
fn test_cli_set_and_remove_properties() {
    // GIVEN a node created with typed properties
    let temp = TempDir::new().unwrap();
    graphfed_ok(
        &temp,
        &["create", "/", "doc", "--prop", "title=Hello", "--prop", "size:long=3"],
    );

    // WHEN one property is replaced and another removed
    graphfed_ok(&temp, &["set", "/doc", "title=World", "--remove", "size"]);

    // THEN only the updated property remains
    let props = graphfed_ok(&temp, &["props", "/doc"]);
    assert!(props.contains(&"title = World".to_string()), "{:?}", props);
    assert!(!props.iter().any(|line| line.starts_with("size")));
}

#[test]
fn test_cli_set_without_assignments_is_rejected() {
    let temp = TempDir::new().unwrap();
    graphfed_ok(&temp, &["create", "/", "doc"]);

    let stderr = graphfed_err(&temp, &["set", "/doc"]);

    assert!(stderr.contains("ERR_ARGUMENT_VALIDATION"), "{}", stderr);
}

#[test]
fn test_cli_rename_reports_old_and_new_paths() {
    let temp = TempDir::new().unwrap();
    graphfed_ok(&temp, &["create", "/", "a"]);

    let output = graphfed_ok(&temp, &["rename", "/a", "b"]);

    assert_eq!(output, vec!["/a -> /b"]);
    assert_eq!(graphfed_ok(&temp, &["ls", "/"]), vec!["/b"]);
}

#[test]
fn test_cli_copy_gets_fresh_identity() {
    // GIVEN a node under /src
    let temp = TempDir::new().unwrap();
    graphfed_ok(&temp, &["create", "/", "src"]);
    graphfed_ok(&temp, &["create", "/", "dst"]);
    let original = graphfed_ok(&temp, &["create", "/src", "n"]);

    // WHEN it is copied into /dst
    let copy = graphfed_ok(&temp, &["cp", "/src/n", "/dst"]);

    // THEN the copy lives at /dst/n with its own identity, the original untouched
    assert_eq!(path_of(&copy[0]), "/dst/n");
    assert_ne!(id_of(&copy[0]), id_of(&original[0]));
    assert_eq!(graphfed_ok(&temp, &["ls", "/src"]), vec!["/src/n"]);
}

#[test]
fn test_cli_move_before_sibling_keeps_identity() {
    // GIVEN /src/n and /dst with children p and q
    let temp = TempDir::new().unwrap();
    graphfed_ok(&temp, &["create", "/", "src"]);
    graphfed_ok(&temp, &["create", "/", "dst"]);
    let original = graphfed_ok(&temp, &["create", "/src", "n"]);
    graphfed_ok(&temp, &["create", "/dst", "p"]);
    graphfed_ok(&temp, &["create", "/dst", "q"]);

    // WHEN n is moved into /dst before q
    let output = graphfed_ok(&temp, &["mv", "/src/n", "/dst", "--before", "/dst/q"]);

    // THEN it sits between p and q and still has its identity
    assert_eq!(output, vec!["/src/n -> /dst/n"]);
    let listing = graphfed_ok(&temp, &["ls", "/dst", "--ids"]);
    let paths: Vec<&str> = listing.iter().map(|l| path_of(l)).collect();
    assert_eq!(paths, vec!["/dst/p", "/dst/n", "/dst/q"]);
    assert_eq!(id_of(&listing[1]), id_of(&original[0]));
    assert!(graphfed_ok(&temp, &["ls", "/src"]).is_empty());
}

#[test]
fn test_cli_rm_deletes_branch() {
    let temp = TempDir::new().unwrap();
    graphfed_ok(&temp, &["create", "/", "a"]);
    graphfed_ok(&temp, &["create", "/a", "b"]);

    let output = graphfed_ok(&temp, &["rm", "/a"]);

    assert_eq!(output, vec!["deleted /a"]);
    assert!(graphfed_ok(&temp, &["ls", "/"]).is_empty());
    let stderr = graphfed_err(&temp, &["ls", "/a/b"]);
    assert!(stderr.contains("ERR_PATH_NOT_FOUND"), "{}", stderr);
}

#[test]
fn test_cli_root_cannot_be_deleted() {
    let temp = TempDir::new().unwrap();

    let stderr = graphfed_err(&temp, &["rm", "/"]);

    assert!(stderr.starts_with("Error: [ERR_"), "{}", stderr);
}
