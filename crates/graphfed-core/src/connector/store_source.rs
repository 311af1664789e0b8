use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use super::listener::SourceListener;
use super::settings::SourceSettings;
use super::source::{Connection, RepositorySource};
use crate::context::ExecutionContext;
use crate::errors::{GraphError, Result};
use crate::model::CachePolicy;
use crate::ops::{MemoryStore, NodeStore};
use crate::processor::RequestProcessor;
use crate::requests::Request;

/// A source backed by any [`NodeStore`]
///
/// All connections share the store behind one mutex, which serializes
/// structural edits on the same parent.
pub struct StoreSource<S> {
    settings: SourceSettings,
    store: Arc<Mutex<S>>,
}

/// In-memory source, mainly for tests and scratch graphs
pub type MemorySource = StoreSource<MemoryStore>;

impl MemorySource {
    pub fn in_memory(settings: SourceSettings) -> Self {
        Self::new(settings, MemoryStore::new())
    }
}

impl<S: NodeStore + Send + 'static> StoreSource<S> {
    pub fn new(settings: SourceSettings, store: S) -> Self {
        Self {
            settings,
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Shared handle on the backing store
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }
}

impl<S: NodeStore + Send + 'static> RepositorySource for StoreSource<S> {
    fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    fn connection(&self) -> Result<Box<dyn Connection>> {
        tracing::debug!(source = self.settings.name(), "opening connection");
        Ok(Box::new(StoreConnection {
            settings: self.settings.clone(),
            store: Arc::clone(&self.store),
            listener: None,
            closed: false,
        }))
    }
}

/// Connection running requests through a [`RequestProcessor`]
pub struct StoreConnection<S> {
    settings: SourceSettings,
    store: Arc<Mutex<S>>,
    listener: Option<Arc<dyn SourceListener>>,
    closed: bool,
}

impl<S: NodeStore + Send> StoreConnection<S> {
    fn lock(&self) -> Result<MutexGuard<'_, S>> {
        self.store.lock().map_err(|_| GraphError::Internal {
            message: format!("store of source '{}' is poisoned", self.settings.name()),
        })
    }
}

impl<S: NodeStore + Send> Connection for StoreConnection<S> {
    fn source_name(&self) -> &str {
        self.settings.name()
    }

    fn default_cache_policy(&self) -> Option<CachePolicy> {
        self.settings.default_cache_policy()
    }

    fn execute(&mut self, context: &ExecutionContext, request: &mut Request) -> Result<()> {
        if self.closed {
            return Err(GraphError::ConnectionClosed {
                source_name: self.settings.name().to_string(),
            });
        }

        let (result, events) = {
            let mut store = self.lock()?;
            let mut processor = RequestProcessor::new(&mut *store, &self.settings, context);
            let result = processor.process(request);
            (result, processor.into_events())
        };

        // Partially applied composites still report what they changed
        if self.settings.capabilities().events && !events.is_empty() {
            if let Some(listener) = &self.listener {
                listener.notify(self.settings.name(), &events);
            }
        }
        result
    }

    fn ping(&self, timeout: Duration) -> bool {
        if self.closed {
            return false;
        }
        let deadline = Instant::now() + timeout;
        loop {
            match self.store.try_lock() {
                Ok(store) => return store.ping().is_ok(),
                Err(TryLockError::Poisoned(_)) => return false,
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return false;
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
            }
        }
    }

    fn set_listener(&mut self, listener: Option<Arc<dyn SourceListener>>) {
        self.listener = listener;
    }

    fn close(&mut self) {
        if !self.closed {
            tracing::debug!(source = self.settings.name(), "closing connection");
            self.closed = true;
            self.listener = None;
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, Path};
    use crate::requests::{CreateNodeRequest, ReadAllChildrenRequest};

    fn source() -> MemorySource {
        MemorySource::in_memory(SourceSettings::new("mem").unwrap())
    }

    #[test]
    fn test_execute_after_close_fails() {
        let mut connection = source().connection().unwrap();
        connection.close();
        connection.close();
        let mut request: Request = ReadAllChildrenRequest::new(Location::root()).into();
        let err = connection
            .execute(&ExecutionContext::new(), &mut request)
            .unwrap_err();
        assert!(matches!(err, GraphError::ConnectionClosed { .. }));
        assert!(connection.is_closed());
    }

    #[test]
    fn test_ping_open_and_closed() {
        let mut connection = source().connection().unwrap();
        assert!(connection.ping(Duration::from_millis(50)));
        connection.close();
        assert!(!connection.ping(Duration::from_millis(50)));
    }

    #[test]
    fn test_ping_times_out_while_store_is_held() {
        let source = source();
        let connection = source.connection().unwrap();
        let store = source.store();
        let _guard = store.lock().unwrap();
        assert!(!connection.ping(Duration::from_millis(20)));
    }

    #[test]
    fn test_connections_share_the_store() {
        let source = source();
        let mut first = source.connection().unwrap();
        let mut second = source.connection().unwrap();
        let context = ExecutionContext::new();

        let mut create: Request = CreateNodeRequest::new(Location::root(), "a").into();
        first.execute(&context, &mut create).unwrap();

        let mut read: Request = ReadAllChildrenRequest::new(Location::at_path(Path::root())).into();
        second.execute(&context, &mut read).unwrap();
        match read {
            Request::ReadAllChildren(r) => assert_eq!(r.children().len(), 1),
            other => panic!("unexpected request {:?}", other),
        }
    }
}
