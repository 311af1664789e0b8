use std::sync::Arc;
use std::time::Duration;

use super::listener::SourceListener;
use super::settings::{SourceCapabilities, SourceSettings};
use crate::context::ExecutionContext;
use crate::errors::Result;
use crate::model::CachePolicy;
use crate::requests::Request;

/// A named, configured backing store that hands out connections
pub trait RepositorySource: Send + Sync {
    fn settings(&self) -> &SourceSettings;

    fn name(&self) -> &str {
        self.settings().name()
    }

    fn capabilities(&self) -> SourceCapabilities {
        self.settings().capabilities()
    }

    /// Advisory only: connections never retry on their own
    fn retry_limit(&self) -> u32 {
        self.settings().retry_limit()
    }

    fn default_cache_policy(&self) -> Option<CachePolicy> {
        self.settings().default_cache_policy()
    }

    /// # Errors
    /// `BackingStore` if the store cannot be reached
    fn connection(&self) -> Result<Box<dyn Connection>>;
}

/// A live session against one source
pub trait Connection: Send {
    fn source_name(&self) -> &str;

    fn default_cache_policy(&self) -> Option<CachePolicy>;

    /// Process one request, writing its outputs back onto it
    ///
    /// # Errors
    /// `ConnectionClosed` after `close()`, otherwise whatever the command fails with
    fn execute(&mut self, context: &ExecutionContext, request: &mut Request) -> Result<()>;

    /// Check that the store answers within `timeout`
    fn ping(&self, timeout: Duration) -> bool;

    /// Replace the listener; `None` restores the default of notifying nobody
    fn set_listener(&mut self, listener: Option<Arc<dyn SourceListener>>);

    /// Release the connection; further calls are no-ops
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}
