//! Structured logging facility
//!
//! - One initialization point, `init(profile)`
//! - Lifecycle macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - In-memory capture for test assertions
//!
//! ```rust
//! use graphfed_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! The request processor owns lifecycle events for each command. Lower layers
//! (index maintenance, stores) emit only `debug!`/`trace!` details.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
