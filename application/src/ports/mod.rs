//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_events;
pub mod conversation_logger;
pub mod document_backend;
pub mod scheduler;
pub mod session_store;
