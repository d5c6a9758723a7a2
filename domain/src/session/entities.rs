//! Session domain entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used when a session was opened from pasted text only.
pub const RAW_TEXT_LABEL: &str = "Raw Text";

/// Label shown when no source label is known.
pub const UNKNOWN_SOURCE_LABEL: &str = "your document";

/// Opaque session handle issued by the backend (Value Object)
///
/// The id is the sole credential for chat and delete calls. It is never
/// inspected, only passed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An active document session (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    source_label: String,
}

impl Session {
    pub fn new(id: SessionId, source_label: impl Into<String>) -> Self {
        Self {
            id,
            source_label: source_label.into(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Human-readable name of the ingested content.
    ///
    /// Falls back to [`UNKNOWN_SOURCE_LABEL`] when the stored label is blank.
    pub fn source_label(&self) -> &str {
        if self.source_label.trim().is_empty() {
            UNKNOWN_SOURCE_LABEL
        } else {
            &self.source_label
        }
    }
}

/// State of the session lifecycle machine
///
/// `NoSession -> Active -> Terminating -> NoSession`. The machine is cyclic
/// across separate document submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    NoSession,
    Active,
    Terminating,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::NoSession => "no_session",
            LifecycleState::Active => "active",
            LifecycleState::Terminating => "terminating",
        }
    }
}

/// Why a session is being torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The user ended the chat
    Explicit,
    /// No activity for the idle timeout
    IdleTimeout,
    /// The window or process is going away
    PageUnload,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Explicit => "explicit",
            TerminationReason::IdleTimeout => "idle_timeout",
            TerminationReason::PageUnload => "page_unload",
        }
    }

    /// Whether the user should be sent back to the submission view.
    ///
    /// On unload there is no view left to navigate.
    pub fn returns_to_submission(&self) -> bool {
        !matches!(self, TerminationReason::PageUnload)
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
