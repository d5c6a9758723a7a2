//! Port for structured conversation logging.
//!
//! [`ConversationLogger`] records the session's conversation (session opened,
//! prompts, answers, failures, teardown) as machine-readable records. It is
//! separate from `tracing`, which carries diagnostics.

use serde_json::Value;

/// A structured conversation event for logging.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type, e.g. "session_created", "prompt", "response".
    pub event_type: &'static str,
    /// Event-specific fields.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events.
///
/// `log` is synchronous and infallible; a failing writer must not disturb
/// the chat.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Logger that records nothing.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
