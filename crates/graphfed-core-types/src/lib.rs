//! Core types shared across graphfed crates
//!
//! This crate provides foundational types used by the connector engine,
//! the persistence layer and the logging facility:
//!
//! - **Correlation types**: RequestId, TraceId, SpanId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, SpanId, TraceId};
