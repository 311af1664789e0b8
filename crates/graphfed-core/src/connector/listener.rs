use crate::model::{Location, Path};

/// A structural or content change made by one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Created { location: Location },
    PropertiesUpdated { location: Location },
    /// Explicit renames and same-name sibling renumbering alike
    Renamed { from: Path, to: Path },
    Copied { original: Location, copy: Location },
    Moved { from: Path, to: Location },
    Deleted { location: Location },
}

/// Receives change events synchronously, on the thread executing the request
pub trait SourceListener: Send + Sync {
    fn notify(&self, source_name: &str, events: &[ChangeEvent]);
}

impl<F> SourceListener for F
where
    F: Fn(&str, &[ChangeEvent]) + Send + Sync,
{
    fn notify(&self, source_name: &str, events: &[ChangeEvent]) {
        self(source_name, events)
    }
}
