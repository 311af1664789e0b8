//! Source configuration
//!
//! A `SourceConfig` is the serializable description of one repository source:
//! its settings plus the backend that stores its nodes. It is usually kept in
//! a TOML file:
//!
//! ```toml
//! name = "docs"
//! default_cache_policy_ms = 1000
//!
//! [capabilities]
//! reordering = false
//!
//! [backend]
//! kind = "sqlite"
//! path = "docs.db"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use graphfed_core::connector::{MemorySource, RepositorySource, StoreSource};
use graphfed_core::{CachePolicy, SourceCapabilities, SourceSettings};
use serde::{Deserialize, Serialize};

use crate::errors::{config_error, io_error, Result};
use crate::fs_tree::FsNodeStore;
use crate::sqlite_store::SqliteNodeStore;

/// Where a source keeps its nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Sqlite { path: PathBuf },
    Filesystem { root: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default)]
    pub retry_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cache_policy_ms: Option<u64>,
    #[serde(default)]
    pub capabilities: SourceCapabilities,
    pub backend: Backend,
}

impl SourceConfig {
    /// In-memory source with default capabilities
    pub fn memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            retry_limit: 0,
            default_cache_policy_ms: None,
            capabilities: SourceCapabilities::default(),
            backend: Backend::Memory,
        }
    }

    /// # Errors
    /// `ArgumentValidation` if the text is not a valid source config
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| config_error(e.to_string()))?;
        config.settings()?;
        Ok(config)
    }

    /// Load a config file; relative backend paths resolve against its directory
    ///
    /// # Errors
    /// `BackingStore` if the file cannot be read, `ArgumentValidation` if its
    /// content is invalid
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| io_error("read_config", e))?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.backend = config.backend.relative_to(base);
        }
        tracing::debug!(config = %path.display(), source = %config.name, "loaded source config");
        Ok(config)
    }

    /// # Errors
    /// `ArgumentValidation` if the config cannot be serialized
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| config_error(e.to_string()))
    }

    /// Validated engine settings for this source
    ///
    /// # Errors
    /// `ArgumentValidation` if the name is blank
    pub fn settings(&self) -> Result<SourceSettings> {
        Ok(SourceSettings::new(self.name.clone())?
            .with_capabilities(self.capabilities)
            .with_retry_limit(self.retry_limit)
            .with_default_cache_policy(self.default_cache_policy_ms.map(CachePolicy::from_millis)))
    }
}

impl Backend {
    fn relative_to(self, base: &Path) -> Self {
        match self {
            Backend::Sqlite { path } if path.is_relative() => Backend::Sqlite {
                path: base.join(path),
            },
            Backend::Filesystem { root } if root.is_relative() => Backend::Filesystem {
                root: base.join(root),
            },
            other => other,
        }
    }
}

/// Build a live source from its config
///
/// # Errors
/// `ArgumentValidation` for invalid settings, `BackingStore` if the backend
/// cannot be opened
pub fn build_source(config: &SourceConfig) -> Result<Box<dyn RepositorySource>> {
    let settings = config.settings()?;
    let source: Box<dyn RepositorySource> = match &config.backend {
        Backend::Memory => Box::new(MemorySource::in_memory(settings)),
        Backend::Sqlite { path } => Box::new(StoreSource::new(settings, SqliteNodeStore::open(path)?)),
        Backend::Filesystem { root } => Box::new(StoreSource::new(settings, FsNodeStore::open(root.clone())?)),
    };
    tracing::debug!(source = %config.name, "built source");
    Ok(source)
}
