use graphfed_core_types::RequestContext;

use crate::model::CachePolicy;

/// Caller-side settings that travel with every executed request
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    request: RequestContext,
    default_cache_policy: Option<CachePolicy>,
    verify_invariants: bool,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_context(mut self, request: RequestContext) -> Self {
        self.request = request;
        self
    }

    /// Caller or federation default, the last candidate before "uncached"
    pub fn with_default_cache_policy(mut self, policy: Option<CachePolicy>) -> Self {
        self.default_cache_policy = policy;
        self
    }

    /// Re-check the ordered-children index of every touched parent after each
    /// mutation
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.verify_invariants = enabled;
        self
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub fn default_cache_policy(&self) -> Option<CachePolicy> {
        self.default_cache_policy
    }

    pub fn verify_invariants(&self) -> bool {
        self.verify_invariants
    }
}
