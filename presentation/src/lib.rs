//! Presentation layer for insight-chat
//!
//! This crate contains the CLI definition, console formatting, the busy
//! spinner, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::Cli;
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
pub use progress::BusyIndicator;
