use serde::{Deserialize, Serialize};

use crate::errors::{GraphError, Result};
use crate::model::CachePolicy;

/// What a source can do; fixed for the lifetime of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCapabilities {
    pub updates: bool,
    pub same_name_siblings: bool,
    pub events: bool,
    /// Explicit placement of a moved node before a sibling
    pub reordering: bool,
}

impl Default for SourceCapabilities {
    fn default() -> Self {
        Self {
            updates: true,
            same_name_siblings: true,
            events: true,
            reordering: true,
        }
    }
}

impl SourceCapabilities {
    /// Capabilities of a source that only answers reads
    pub fn read_only() -> Self {
        Self {
            updates: false,
            ..Self::default()
        }
    }
}

/// Validated, typed configuration of a repository source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    name: String,
    capabilities: SourceCapabilities,
    retry_limit: u32,
    default_cache_policy: Option<CachePolicy>,
}

impl SourceSettings {
    /// # Errors
    /// `ArgumentValidation` if `name` is empty or blank
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GraphError::invalid_argument(
                "name",
                "source name must not be empty",
            ));
        }
        Ok(Self {
            name,
            capabilities: SourceCapabilities::default(),
            retry_limit: 0,
            default_cache_policy: None,
        })
    }

    pub fn with_capabilities(mut self, capabilities: SourceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Advisory hint for whoever hands out connections; 0 means unspecified
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    pub fn with_default_cache_policy(mut self, policy: Option<CachePolicy>) -> Self {
        self.default_cache_policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> SourceCapabilities {
        self.capabilities
    }

    pub fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    pub fn default_cache_policy(&self) -> Option<CachePolicy> {
        self.default_cache_policy
    }
}
