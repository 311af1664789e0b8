use graphfed_core_types::{RequestId, TraceId};
use thiserror::Error;

use crate::model::{Location, Path};

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by a connector maps onto one of these kinds. Each kind
/// has a stable code used by the CLI, by log events and by callers that branch
/// on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Resolution
    PathNotFound,
    IdentityMismatch,

    // Request validation
    ArgumentValidation,
    UnsupportedOperation,

    // Backing store / integration
    BackingStore,
    ConnectionClosed,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::PathNotFound => "ERR_PATH_NOT_FOUND",
            ExErrorKind::IdentityMismatch => "ERR_IDENTITY_MISMATCH",
            ExErrorKind::ArgumentValidation => "ERR_ARGUMENT_VALIDATION",
            ExErrorKind::UnsupportedOperation => "ERR_UNSUPPORTED_OPERATION",
            ExErrorKind::BackingStore => "ERR_BACKING_STORE",
            ExErrorKind::ConnectionClosed => "ERR_CONNECTION_CLOSED",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a caller can reasonably retry or re-route after this failure
    ///
    /// A missing path can be retried against another location, and a rejected
    /// unsupported command leaves the source untouched. Everything else is fatal
    /// to the call that raised it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExErrorKind::PathNotFound | ExErrorKind::UnsupportedOperation
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus whatever context was known at the point of
/// failure (operation, path, node identity, source, correlation ids).
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    node_id: Option<String>,
    source_name: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            node_id: None,
            source_name: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the path the failure relates to
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add node identity context
    pub fn with_node_id(mut self, id: impl Into<String>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    /// Add the name of the source that raised the error
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(node_id) = &self.node_id {
            write!(f, " (node_id: {})", node_id)?;
        }
        if let Some(source_name) = &self.source_name {
            write!(f, " (source: {})", source_name)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for connector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A location could not be resolved to a node
    ///
    /// `lowest_existing` is the deepest ancestor of the requested path that does
    /// resolve, so callers can report or continue a partial traversal.
    #[error("Path not found: {location}")]
    PathNotFound {
        location: Location,
        lowest_existing: Option<Path>,
    },

    /// A required input was missing, empty, negative or malformed
    #[error("Invalid argument '{argument}': {reason}")]
    ArgumentValidation { argument: String, reason: String },

    /// An actual location does not denote the same node as its input location
    #[error("Identity mismatch for {expected}: {reason}")]
    IdentityMismatch {
        expected: Location,
        actual: Option<Location>,
        reason: String,
    },

    /// The source's capabilities do not allow the requested command
    #[error("Source '{source_name}' does not support {operation}")]
    UnsupportedOperation {
        source_name: String,
        operation: String,
    },

    /// The underlying store failed
    #[error("Backing store failure during {op}: {message}")]
    BackingStore { op: String, message: String },

    /// A move copied the branch but could not remove the original
    #[error("Move of {from} left a copy at {copy}: {message}")]
    MoveLeftCopy {
        from: Path,
        copy: Path,
        message: String,
    },

    /// The connection was used after `close()`
    #[error("Connection to source '{source_name}' is closed")]
    ConnectionClosed { source_name: String },

    /// Serialization error (JSON encoding/decoding of stored values)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GraphError {
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        GraphError::ArgumentValidation {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn store(op: impl Into<String>, message: impl Into<String>) -> Self {
        GraphError::BackingStore {
            op: op.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(source_name: impl Into<String>, operation: impl Into<String>) -> Self {
        GraphError::UnsupportedOperation {
            source_name: source_name.into(),
            operation: operation.into(),
        }
    }

    /// Canonical kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            GraphError::PathNotFound { .. } => ExErrorKind::PathNotFound,
            GraphError::ArgumentValidation { .. } => ExErrorKind::ArgumentValidation,
            GraphError::IdentityMismatch { .. } => ExErrorKind::IdentityMismatch,
            GraphError::UnsupportedOperation { .. } => ExErrorKind::UnsupportedOperation,
            GraphError::BackingStore { .. } | GraphError::MoveLeftCopy { .. } => {
                ExErrorKind::BackingStore
            }
            GraphError::ConnectionClosed { .. } => ExErrorKind::ConnectionClosed,
            GraphError::Serialization { .. } => ExErrorKind::Serialization,
            GraphError::Internal { .. } => ExErrorKind::Internal,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind().is_recoverable()
    }
}

/// Conversion from GraphError to ExError
impl From<GraphError> for ExError {
    fn from(err: GraphError) -> Self {
        let kind = err.kind();
        match err {
            GraphError::PathNotFound {
                location,
                lowest_existing,
            } => {
                let mut ex = ExError::new(kind).with_op("resolve");
                if let Some(path) = location.path() {
                    ex = ex.with_path(path.to_string());
                }
                if let Some(id) = location.id() {
                    ex = ex.with_node_id(id.to_string());
                }
                let message = match lowest_existing {
                    Some(ancestor) => format!("Lowest existing ancestor is {}", ancestor),
                    None => "No ancestor exists".to_string(),
                };
                ex.with_message(message)
            }

            GraphError::ArgumentValidation { argument, reason } => {
                ExError::new(kind).with_message(format!("{}: {}", argument, reason))
            }

            GraphError::IdentityMismatch {
                expected,
                actual,
                reason,
            } => {
                let mut ex = ExError::new(kind);
                if let Some(path) = expected.path() {
                    ex = ex.with_path(path.to_string());
                }
                let actual = actual
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "<none>".to_string());
                ex.with_message(format!("{} (actual: {})", reason, actual))
            }

            GraphError::UnsupportedOperation {
                source_name,
                operation,
            } => ExError::new(kind)
                .with_source_name(source_name)
                .with_op(operation)
                .with_message("Rejected by source capabilities"),

            GraphError::BackingStore { op, message } => {
                ExError::new(kind).with_op(op).with_message(message)
            }

            GraphError::MoveLeftCopy {
                from,
                copy,
                message,
            } => ExError::new(kind)
                .with_op("move_branch")
                .with_path(from.to_string())
                .with_message(format!(
                    "Original could not be removed, copy remains at {}: {}",
                    copy, message
                )),

            GraphError::ConnectionClosed { source_name } => ExError::new(kind)
                .with_source_name(source_name)
                .with_message("Connection is closed"),

            GraphError::Serialization { message } => ExError::new(kind).with_message(message),

            GraphError::Internal { message } => ExError::new(kind).with_message(message),
        }
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Serialization {
            message: err.to_string(),
        }
    }
}
