use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{GraphError, Result};

/// Time-to-live applied to results read from a source
///
/// On the wire this is a bare non-negative integer of milliseconds; an absent
/// value (`None` at the use site) means "no policy at this level".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CachePolicy {
    ttl_ms: u64,
}

impl CachePolicy {
    pub fn from_millis(ttl_ms: u64) -> Self {
        Self { ttl_ms }
    }

    /// Build a policy from a signed wire value
    ///
    /// # Errors
    /// Returns `ArgumentValidation` for negative values.
    pub fn try_from_millis(ttl_ms: i64) -> Result<Self> {
        u64::try_from(ttl_ms)
            .map(Self::from_millis)
            .map_err(|_| GraphError::invalid_argument("cache_policy", "time-to-live cannot be negative"))
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}
