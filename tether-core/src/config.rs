//! Runtime configuration.
//!
//! A [`RuntimeConfig`] is fixed when a model is built and shared by the
//! scanner that binds against it.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What the scanner does with a binding site that names an unknown key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeyPolicy {
    /// Record a `MissingKey` error and leave the site unbound.
    #[default]
    Skip,
    /// Bind anyway; the unknown token renders as an empty string.
    Empty,
}

/// Tunables for a model and its scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Nested `set` calls allowed on one thread before failing with
    /// `ReentrancyOverflow`.
    pub max_notify_depth: usize,

    /// Handling of binding sites that reference unknown keys.
    pub missing_keys: MissingKeyPolicy,

    /// Emit `trace` events for every get and set.
    pub trace_access: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_notify_depth: 64,
            missing_keys: MissingKeyPolicy::Skip,
            trace_access: true,
        }
    }
}

impl RuntimeConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_notify_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_notify_depth",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    pub fn with_max_notify_depth(mut self, depth: usize) -> Self {
        self.max_notify_depth = depth;
        self
    }

    pub fn with_missing_keys(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_keys = policy;
        self
    }

    pub fn with_trace_access(mut self, enabled: bool) -> Self {
        self.trace_access = enabled;
        self
    }
}
