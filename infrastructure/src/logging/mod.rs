//! Conversation logging
//!
//! [`JsonlConversationLogger`] appends one JSON record per
//! [`ConversationEvent`](insight_application::ConversationEvent) to a file.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;
