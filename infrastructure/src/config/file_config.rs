//! Raw TOML configuration data types
//!
//! These structs mirror the structure of the TOML config file and are
//! deserialized directly.

use insight_application::SessionConfig;
use insight_domain::DEFAULT_IDLE_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Backend used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("backend.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("backend.base_url must be an http(s) URL, got {0:?}")]
    InvalidBaseUrl(String),

    #[error("backend.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("session.idle_timeout_seconds cannot be 0")]
    InvalidIdleTimeout,
}

/// Raw backend configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Base URL of the question-answering backend
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: Option<u64>,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: None,
        }
    }
}

impl FileBackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Raw session configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Inactivity period before a session is ended
    pub idle_timeout_seconds: u64,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: DEFAULT_IDLE_TIMEOUT.as_secs(),
        }
    }
}

impl FileSessionConfig {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig::with_idle_timeout_seconds(self.idle_timeout_seconds)
    }
}

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Print the banner when the REPL starts
    pub show_banner: bool,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_banner: true,
        }
    }
}

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write the conversation as JSONL to this file
    pub conversation_log: Option<PathBuf>,
}

/// Complete configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend connection
    pub backend: FileBackendConfig,
    /// Session behavior
    pub session: FileSessionConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Logging settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let base_url = self.backend.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        match url::Url::parse(base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => return Err(ConfigValidationError::InvalidBaseUrl(base_url.to_string())),
        }

        if let Some(0) = self.backend.timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if self.session.idle_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidIdleTimeout);
        }

        Ok(())
    }

    /// Render as TOML (for `--show-config`)
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
