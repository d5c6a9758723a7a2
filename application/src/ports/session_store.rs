//! Session store port
//!
//! Holds the one active [`Session`]. The lifecycle controller is the only
//! writer; the chat engine and activity monitor only read.

use insight_domain::Session;
use std::sync::Mutex;

/// Process-local holder of the active session
///
/// Each operation is atomic on its own. [`SessionStore::take`] is what makes
/// termination idempotent: of two racing callers, exactly one gets the session.
pub trait SessionStore: Send + Sync {
    /// The active session, if any
    fn current(&self) -> Option<Session>;

    /// Store a session, returning the one it replaced
    fn replace(&self, session: Session) -> Option<Session>;

    /// Remove and return the active session
    fn take(&self) -> Option<Session>;

    fn has_session(&self) -> bool {
        self.current().is_some()
    }
}

/// In-memory [`SessionStore`]; nothing outlives the process.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a session
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn current(&self) -> Option<Session> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn replace(&self, session: Session) -> Option<Session> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(session)
    }

    fn take(&self) -> Option<Session> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}
