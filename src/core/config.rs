//! Queue configuration
//!
//! Configuration for the scan admission queue. Values are deserialized from a
//! TOML fragment supplied by the surrounding configuration loader, with
//! defaults for every field so an empty table is a valid configuration.

use serde::Deserialize;
use std::time::Duration;

use crate::core::error_handling::ContextualError;

/// Priority assigned to interactive scan submissions unless overridden
pub const DEFAULT_INTERACTIVE_PRIORITY: i32 = 0;

/// Priority assigned to bulk batch members, strictly below interactive
pub const DEFAULT_BULK_PRIORITY: i32 = -1;

/// Configuration for the scan admission queue
///
/// `max_concurrent` is the global concurrency ceiling. The surrounding
/// administrative surface bounds it to a sane range (1-20); the queue itself
/// accepts any positive integer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Maximum number of scans executing at once
    pub max_concurrent: usize,
    /// Default priority for interactive submissions
    pub interactive_priority: i32,
    /// Default priority for bulk batch members
    pub bulk_priority: i32,
    /// Seed for the wait-time estimator before any scan has finished
    pub default_scan_duration_secs: u64,
    /// Number of observed scan durations kept in the rolling average
    pub duration_window: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            interactive_priority: DEFAULT_INTERACTIVE_PRIORITY,
            bulk_priority: DEFAULT_BULK_PRIORITY,
            default_scan_duration_secs: 120,
            duration_window: 50,
        }
    }
}

impl QueueConfig {
    /// Parse a configuration from a TOML fragment and validate it
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: QueueConfig = toml::from_str(input).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the queue relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid {
                message: "max_concurrent must be greater than 0".to_string(),
            });
        }
        if self.duration_window == 0 {
            return Err(ConfigError::Invalid {
                message: "duration_window must be greater than 0".to_string(),
            });
        }
        if self.default_scan_duration_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "default_scan_duration_secs must be greater than 0".to_string(),
            });
        }
        if self.bulk_priority >= self.interactive_priority {
            return Err(ConfigError::Invalid {
                message: format!(
                    "bulk_priority ({}) must be strictly below interactive_priority ({})",
                    self.bulk_priority, self.interactive_priority
                ),
            });
        }
        Ok(())
    }

    /// Estimator seed as a `Duration`
    pub fn default_scan_duration(&self) -> Duration {
        Duration::from_secs(self.default_scan_duration_secs)
    }
}

/// Configuration error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true // Configuration problems are always fixable by the operator
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { message } => Some(message),
            ConfigError::Parse { message } => Some(message),
        }
    }
}
