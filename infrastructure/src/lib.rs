//! Infrastructure layer for insight-chat
//!
//! Adapters for the ports defined in the application layer: the HTTP
//! document backend, the Tokio timer, the JSONL conversation log, and
//! configuration file loading.

pub mod backend;
pub mod config;
pub mod logging;
pub mod scheduler;

pub use backend::HttpDocumentBackend;
pub use config::{
    ConfigLoader, ConfigValidationError, DEFAULT_BASE_URL, FileBackendConfig, FileConfig,
    FileLoggingConfig, FileReplConfig, FileSessionConfig,
};
pub use logging::JsonlConversationLogger;
pub use scheduler::TokioScheduler;
