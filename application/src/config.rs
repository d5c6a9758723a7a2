//! Application-level configuration.
//!
//! Controls how the session use cases behave at runtime, such as the idle
//! timeout of the activity monitor.

use insight_domain::DEFAULT_IDLE_TIMEOUT;
use std::time::Duration;

/// Session behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a chat view may stay without activity before the session ends.
    pub idle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// Creates a SessionConfig with the idle timeout given in seconds.
    pub fn with_idle_timeout_seconds(seconds: u64) -> Self {
        Self {
            idle_timeout: Duration::from_secs(seconds),
        }
    }
}
