//! Configuration types for multicast dispatch
//!
//! This module defines how a `MulticastDelegate` reacts to entries it
//! cannot dispatch, i.e. member delegates whose receiver was dropped or is
//! already mutably borrowed.

/// What a broadcast does with an entry that cannot be dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchPolicy {
    /// Abort the broadcast at the first failing entry
    #[default]
    FailFast,

    /// Log the failure, skip the entry, and keep going
    SkipUnavailable,
}

/// Configuration for a `MulticastDelegate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Reaction to entries that fail to dispatch
    /// Default: `DispatchPolicy::FailFast`
    pub dispatch_policy: DispatchPolicy,

    /// Check every receiver is alive before running any entry
    ///
    /// Under `FailFast` this turns a dropped receiver into an error before
    /// any callback has run, instead of part-way through the broadcast.
    /// Default: true
    pub preflight: bool,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            dispatch_policy: DispatchPolicy::FailFast,
            preflight: true,
        }
    }
}

impl BroadcastConfig {
    /// Create a BroadcastConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort on the first unavailable entry, checking receivers up front
    pub fn fail_fast() -> Self {
        Self::default()
    }

    /// Skip unavailable entries and dispatch to everything else
    pub fn lenient() -> Self {
        Self {
            dispatch_policy: DispatchPolicy::SkipUnavailable,
            preflight: false,
        }
    }

    /// Set how entries that fail to dispatch are handled
    pub fn with_dispatch_policy(mut self, policy: DispatchPolicy) -> Self {
        self.dispatch_policy = policy;
        self
    }

    /// Enable or disable the liveness check before a fail-fast broadcast
    pub fn with_preflight(mut self, enabled: bool) -> Self {
        self.preflight = enabled;
        self
    }

    /// Whether a dropped receiver should be caught before dispatching
    pub(crate) fn checks_before_dispatch(&self) -> bool {
        self.preflight && self.dispatch_policy == DispatchPolicy::FailFast
    }
}
