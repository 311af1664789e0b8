//! Subcommands and the session they share

pub mod node;
pub mod read;
pub mod values;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use graphfed_core::logging_facility::{init, Profile};
use graphfed_core::requests::Request;
use graphfed_core::{
    ChangeEvent, Connection, ExecutionContext, GraphError, Location, NodeId, Path, Result,
};
use graphfed_store::errors::io_error;
use graphfed_store::{build_source, Backend, SourceConfig};

/// Name of the source opened from a bare `--db`
const LOCAL_SOURCE: &str = "local";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogMode {
    Off,
    /// Human-readable debug output on stderr
    Dev,
    /// JSON events on stderr
    Json,
}

/// Where the graph lives; shared by every subcommand
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// SQLite database holding the graph (ignored with --config)
    #[arg(long, global = true, default_value = ".graphfed/graph.db")]
    pub db: PathBuf,

    /// TOML source config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogMode::Off)]
    pub log: LogMode,
}

pub fn init_logging(mode: LogMode) {
    match mode {
        LogMode::Off => {}
        LogMode::Dev => init(Profile::Development),
        LogMode::Json => init(Profile::Production),
    }
}

/// One open connection plus the context every request runs with
pub struct Session {
    connection: Box<dyn Connection>,
    context: ExecutionContext,
}

impl Session {
    pub fn open(args: &SourceArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => SourceConfig::from_file(path)?,
            None => {
                if let Some(dir) = args.db.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir).map_err(|e| io_error("create_db_dir", e))?;
                }
                SourceConfig {
                    backend: Backend::Sqlite {
                        path: args.db.clone(),
                    },
                    ..SourceConfig::memory(LOCAL_SOURCE)
                }
            }
        };

        let source = build_source(&config)?;
        let mut connection = source.connection()?;
        connection.set_listener(Some(Arc::new(|source: &str, events: &[ChangeEvent]| {
            for event in events {
                tracing::info!(source, event = ?event, "graph changed");
            }
        })));
        let context = ExecutionContext::new()
            .with_default_cache_policy(source.default_cache_policy())
            .with_invariant_checks(true);
        tracing::debug!(source = source.name(), "cli session opened");

        Ok(Self {
            connection,
            context,
        })
    }

    /// Execute one request and hand it back with its outputs filled in
    pub fn run<R>(&mut self, request: R) -> Result<R>
    where
        R: Into<Request> + TryFrom<Request, Error = Request>,
    {
        let mut request = request.into();
        self.connection.execute(&self.context, &mut request)?;
        R::try_from(request).map_err(|other| GraphError::Internal {
            message: format!("connection returned a different request: {}", other.op_name()),
        })
    }

    pub fn close(&mut self) {
        self.connection.close();
    }
}

/// Parse a location argument: an absolute path, or a bare node identity
pub fn parse_location(text: &str) -> Result<Location> {
    if text.starts_with('/') {
        return Ok(Location::at_path(text.parse::<Path>()?));
    }
    text.parse::<NodeId>()
        .map(Location::with_id)
        .map_err(|_| {
            GraphError::invalid_argument(
                "location",
                format!("'{}' is neither an absolute path nor a node id", text),
            )
        })
}

/// Path of an actual location, falling back to its full display form
pub fn display_path(location: Option<&Location>) -> String {
    match location {
        Some(location) => match location.path() {
            Some(path) => path.to_string(),
            None => location.to_string(),
        },
        None => "<unresolved>".to_string(),
    }
}
