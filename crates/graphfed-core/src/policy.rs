//! Cache policy resolution
//!
//! Picks the first policy present along the chain request override, then
//! connection default, then the caller's (federation) default. `None` means
//! the result is uncached. Resolution is pure: callers supply every level.

use crate::model::CachePolicy;

/// The candidate policies, most specific first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicyChain {
    pub request: Option<CachePolicy>,
    pub connection: Option<CachePolicy>,
    pub context: Option<CachePolicy>,
}

impl CachePolicyChain {
    pub fn resolve(&self) -> Option<CachePolicy> {
        resolve_cache_policy(self.request, self.connection, self.context)
    }
}

/// Resolve the effective cache policy
///
/// # Example
/// ```
/// use graphfed_core::model::CachePolicy;
/// use graphfed_core::policy::resolve_cache_policy;
///
/// let request = Some(CachePolicy::from_millis(500));
/// let connection = Some(CachePolicy::from_millis(1000));
/// assert_eq!(resolve_cache_policy(request, connection, None), request);
/// assert_eq!(resolve_cache_policy(None, connection, None), connection);
/// ```
pub fn resolve_cache_policy(
    request: Option<CachePolicy>,
    connection: Option<CachePolicy>,
    context: Option<CachePolicy>,
) -> Option<CachePolicy> {
    request.or(connection).or(context)
}
