//! Domain layer for insight-chat
//!
//! This crate contains the entities and value objects of a document chat
//! session. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Session
//!
//! A session binds an opaque backend handle to one ingested document. It is
//! opened by a [`DocumentSubmission`] (file, URL, or pasted text) and lives
//! until it is ended explicitly, times out, or the client goes away.
//!
//! ## Transcript
//!
//! The ordered, append-only list of [`Message`]s exchanged while the chat view
//! is open.

pub mod activity;
pub mod chat;
pub mod core;
pub mod session;

// Re-export commonly used types
pub use activity::{ActivitySignal, DEFAULT_IDLE_TIMEOUT};
pub use chat::entities::{EMPTY_RESPONSE_PLACEHOLDER, Message, Role, Transcript};
pub use core::error::ValidationError;
pub use session::{
    entities::{
        LifecycleState, RAW_TEXT_LABEL, Session, SessionId, TerminationReason,
        UNKNOWN_SOURCE_LABEL,
    },
    submission::{
        AcceptedMediaType, DocumentSubmission, UploadFile, ValidatedFile, ValidatedSubmission,
    },
};
