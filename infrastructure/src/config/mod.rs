//! Configuration file loading for insight-chat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Environment: `INSIGHT_*` variables (`INSIGHT_BACKEND__BASE_URL`, ...)
//! 3. Project root: `./insight.toml` or `./.insight.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/insight-chat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_BASE_URL, FileBackendConfig, FileConfig, FileLoggingConfig,
    FileReplConfig, FileSessionConfig,
};
pub use loader::ConfigLoader;
