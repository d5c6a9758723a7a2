//! Shared state handed to every session use case.

use crate::ports::chat_events::{ChatEventSink, NoChatEvents};
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::session_store::{InMemorySessionStore, SessionStore};
use insight_domain::Transcript;
use std::sync::{Arc, Mutex, MutexGuard};

/// Transcript shared between the chat engine (writer) and the lifecycle
/// controller (which clears it).
pub type SharedTranscript = Arc<Mutex<Transcript>>;

/// State shared by the lifecycle controller and chat engine
///
/// Built once and injected into both, instead of living in globals.
#[derive(Clone)]
pub struct SessionContext {
    pub store: Arc<dyn SessionStore>,
    pub transcript: SharedTranscript,
    pub events: Arc<dyn ChatEventSink>,
    pub conversation_logger: Arc<dyn ConversationLogger>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>, events: Arc<dyn ChatEventSink>) -> Self {
        Self {
            store,
            transcript: Arc::new(Mutex::new(Transcript::new())),
            events,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub(crate) fn transcript(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(Arc::new(InMemorySessionStore::new()), Arc::new(NoChatEvents))
    }
}
