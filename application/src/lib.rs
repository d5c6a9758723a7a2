//! Application layer for insight-chat
//!
//! This crate contains the session use cases, port definitions, and
//! application configuration. It depends only on the domain layer.
//!
//! - [`SessionLifecycleController`]: opens, validates and tears down sessions
//! - [`ActivityMonitor`]: idle countdown rearmed by user activity
//! - [`ChatExchangeEngine`]: one prompt/answer exchange at a time, in order

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::SessionConfig;
pub use ports::{
    chat_events::{ChatEvent, ChatEventSink, NoChatEvents, Notice, NoticeLevel, View},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    document_backend::{AskReply, BackendError, BackendOperation, DocumentBackend},
    scheduler::{ExpiryTask, ManualScheduler, Scheduler, TimerHandle},
    session_store::{InMemorySessionStore, SessionStore},
};
pub use use_cases::activity_monitor::ActivityMonitor;
pub use use_cases::chat_exchange::{ChatExchangeEngine, IgnoreReason, SendOutcome};
pub use use_cases::context::{SessionContext, SharedTranscript};
pub use use_cases::session_lifecycle::{
    CreateSessionError, NoActiveSession, SessionLifecycleController,
};
