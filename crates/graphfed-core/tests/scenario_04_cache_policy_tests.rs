/// Scenario 4: Cache policy resolution on reads
///
/// Request policy beats the source default, which beats the execution
/// context default.
mod common;

use common::{create, loc};
use graphfed_core::connector::{MemorySource, RepositorySource};
use graphfed_core::requests::{ReadAllChildrenRequest, ReadNodeRequest, Request};
use graphfed_core::{CachePolicy, ExecutionContext, SourceSettings};

fn source_with_default(ttl_ms: Option<u64>) -> MemorySource {
    let settings = SourceSettings::new("cached")
        .unwrap()
        .with_default_cache_policy(ttl_ms.map(CachePolicy::from_millis));
    MemorySource::in_memory(settings)
}

fn resolved_ttl(source: &MemorySource, context: &ExecutionContext, request: ReadNodeRequest) -> Option<u64> {
    let mut conn = source.connection().unwrap();
    let mut request = Request::from(request);
    conn.execute(context, &mut request).unwrap();
    match request {
        Request::ReadNode(r) => r.cache.resolved().map(|p| p.ttl_ms()),
        other => panic!("unexpected request {:?}", other),
    }
}

#[test]
fn test_scenario_04_request_policy_wins() {
    // GIVEN a source defaulting to 1000ms
    let source = source_with_default(Some(1000));

    // WHEN a read asks for 500ms
    let request = ReadNodeRequest::new(loc("/")).with_cache_policy(CachePolicy::from_millis(500));

    // THEN the result carries 500ms
    assert_eq!(
        resolved_ttl(&source, &ExecutionContext::new(), request),
        Some(500)
    );
}

#[test]
fn test_scenario_04_source_default_applies() {
    let source = source_with_default(Some(1000));
    let context = ExecutionContext::new().with_default_cache_policy(Some(CachePolicy::from_millis(250)));

    assert_eq!(
        resolved_ttl(&source, &context, ReadNodeRequest::new(loc("/"))),
        Some(1000)
    );
}

#[test]
fn test_scenario_04_context_default_is_last_resort() {
    let source = source_with_default(None);
    let context = ExecutionContext::new().with_default_cache_policy(Some(CachePolicy::from_millis(250)));

    assert_eq!(
        resolved_ttl(&source, &context, ReadNodeRequest::new(loc("/"))),
        Some(250)
    );
    assert_eq!(
        resolved_ttl(&source, &ExecutionContext::new(), ReadNodeRequest::new(loc("/"))),
        None
    );
}

#[test]
fn test_scenario_04_every_read_resolves() {
    let source = source_with_default(Some(1000));
    let mut conn = source.connection().unwrap();
    create(conn.as_mut(), "/", "a");

    let mut request = Request::from(ReadAllChildrenRequest::new(loc("/")));
    conn.execute(&ExecutionContext::new(), &mut request).unwrap();
    let Request::ReadAllChildren(read) = request else {
        panic!("unexpected request");
    };
    assert_eq!(read.cache.resolved(), Some(CachePolicy::from_millis(1000)));
    assert_eq!(read.children().len(), 1);
}
