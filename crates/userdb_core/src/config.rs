//! Configuration for merge, import and snapshot sessions.

use crate::decay::{Decay, ExponentialDecay, DEFAULT_DECAY_RATE};
use crate::snapshot::{FormatRegistry, PLAIN_SNAPSHOT_SUFFIX};
use std::sync::Arc;

/// What a driver does when a single record fails to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop the whole session at the first failed record.
    Abort,
    /// Log the failure, count it, and go on with the next record.
    #[default]
    Continue,
}

/// Configuration shared by sessions that write into a local store.
#[derive(Debug, Clone)]
pub struct UserDbConfig {
    /// Identity of the local replica, written to `/user_id`.
    pub user_id: String,
    /// Version string written to `/rime_version` on new stores.
    pub rime_version: String,
    /// File-name suffix selecting the plain text snapshot format.
    pub snapshot_suffix: String,
    /// Rate of the default exponential decay.
    pub decay_rate: f64,
    /// Per-record failure handling in drivers.
    pub on_record_error: ErrorPolicy,
}

impl Default for UserDbConfig {
    fn default() -> Self {
        Self {
            user_id: uuid::Uuid::new_v4().to_string(),
            rime_version: crate::VERSION.to_string(),
            snapshot_suffix: PLAIN_SNAPSHOT_SUFFIX.to_string(),
            decay_rate: DEFAULT_DECAY_RATE,
            on_record_error: ErrorPolicy::Continue,
        }
    }
}

impl UserDbConfig {
    /// Creates a new configuration with default values and a fresh user id.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the local replica identity.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Sets the version string recorded in new stores.
    #[must_use]
    pub fn with_rime_version(mut self, version: impl Into<String>) -> Self {
        self.rime_version = version.into();
        self
    }

    /// Sets the plain text snapshot suffix.
    #[must_use]
    pub fn with_snapshot_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.snapshot_suffix = suffix.into();
        self
    }

    /// Sets the decay rate.
    #[must_use]
    pub fn with_decay_rate(mut self, rate: f64) -> Self {
        self.decay_rate = rate;
        self
    }

    /// Sets the per-record error policy.
    #[must_use]
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_record_error = policy;
        self
    }

    /// Builds the decay strategy.
    #[must_use]
    pub fn decay(&self) -> Arc<dyn Decay> {
        Arc::new(ExponentialDecay::new(self.decay_rate))
    }

    /// Builds the snapshot format registry.
    #[must_use]
    pub fn format_registry(&self) -> FormatRegistry {
        FormatRegistry::with_plain_suffix(&self.snapshot_suffix)
    }
}
