//! Presentation-level configuration

use std::time::Duration;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Print the welcome banner on start
    pub show_banner: bool,
    /// Show a spinner while waiting on the backend
    pub show_progress: bool,
    /// Idle timeout, shown in the help text
    pub idle_timeout: Duration,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_banner: true,
            show_progress: true,
            idle_timeout: insight_domain::DEFAULT_IDLE_TIMEOUT,
        }
    }
}
