#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{connect, loc, memory_source};
use graphfed_core::logging_facility::init_test_capture;
use graphfed_core::requests::{CreateNodeRequest, DeleteBranchRequest, Request};
use graphfed_core::{ExecutionContext, Location};
use graphfed_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_COMPONENT, FIELD_DURATION_MS, FIELD_ERR_CODE,
    FIELD_ERR_KIND, FIELD_REQUEST_ID, FIELD_SOURCE,
};
use graphfed_core_types::{RequestContext, RequestId};

fn context(request_id: &str) -> ExecutionContext {
    ExecutionContext::new().with_request_context(RequestContext::with_request_id(
        RequestId::from_string(request_id.to_string()),
    ))
}

#[test]
fn test_processor_logs_start_and_end() {
    let capture = init_test_capture();
    let request_id = "log-test-start-end";

    let source = memory_source();
    let mut conn = connect(&source);
    let mut request: Request = CreateNodeRequest::new(Location::root(), "x").into();
    conn.execute(&context(request_id), &mut request).unwrap();

    let events = capture.events_with(FIELD_REQUEST_ID, request_id);
    let starts = events
        .iter()
        .filter(|e| e.op.as_deref() == Some("create_node") && e.event.as_deref() == Some(EVENT_START))
        .count();
    let ends: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some("create_node") && e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(starts, 1);
    assert_eq!(ends.len(), 1);
    assert!(ends[0].field(FIELD_DURATION_MS).is_some());
    assert!(ends[0].field(FIELD_COMPONENT).is_some());

    let start = events
        .iter()
        .find(|e| e.event.as_deref() == Some(EVENT_START))
        .unwrap();
    assert_eq!(start.field(FIELD_SOURCE), Some("test-source"));
}

#[test]
fn test_processor_logs_error_code() {
    let capture = init_test_capture();
    let request_id = "log-test-error-code";

    let source = memory_source();
    let mut conn = connect(&source);
    let mut request: Request = DeleteBranchRequest::new(loc("/missing")).into();
    conn.execute(&context(request_id), &mut request).unwrap_err();

    let errors: Vec<_> = capture
        .events_with(FIELD_REQUEST_ID, request_id)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].op.as_deref(), Some("delete_branch"));
    assert_eq!(errors[0].field(FIELD_ERR_CODE), Some("ERR_PATH_NOT_FOUND"));
    assert_eq!(errors[0].field(FIELD_ERR_KIND), Some("PathNotFound"));
}

#[test]
fn test_composite_logs_each_nested_request() {
    let capture = init_test_capture();
    let request_id = "log-test-composite";

    let source = memory_source();
    let mut conn = connect(&source);
    let mut batch = graphfed_core::requests::CompositeRequest::default();
    batch.push(CreateNodeRequest::new(Location::root(), "a"));
    batch.push(CreateNodeRequest::new(loc("/a"), "b"));
    let mut request: Request = batch.into();
    conn.execute(&context(request_id), &mut request).unwrap();

    let ops: Vec<String> = capture
        .events_with(FIELD_REQUEST_ID, request_id)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_START))
        .filter_map(|e| e.op)
        .collect();
    assert_eq!(ops, vec!["composite", "create_node", "create_node"]);
}
