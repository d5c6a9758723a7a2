//! Document backend port
//!
//! Defines the interface for the question-answering backend: opening a
//! session from a document, asking about it, and deleting it.

use async_trait::async_trait;
use insight_domain::{SessionId, ValidatedSubmission};
use thiserror::Error;

/// Backend operation, used to pick the fallback error text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendOperation {
    SubmitDocument,
    Ask,
    DeleteSession,
}

impl BackendOperation {
    /// User-facing message when the backend gives no detail
    pub fn fallback_message(&self) -> &'static str {
        match self {
            BackendOperation::SubmitDocument => "Upload failed.",
            BackendOperation::Ask => "Chat failed.",
            BackendOperation::DeleteSession => "Delete session failed.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendOperation::SubmitDocument => "submit_document",
            BackendOperation::Ask => "ask",
            BackendOperation::DeleteSession => "delete_session",
        }
    }
}

/// Errors that can occur during backend operations
///
/// Every variant displays as the text to show the user: the backend's
/// `detail` when it sent one, otherwise the per-operation fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never got an answer
    #[error("{message}")]
    Unreachable { message: String, cause: String },

    /// A 2xx answer that could not be used
    #[error("{message}")]
    InvalidResponse { message: String, cause: String },
}

impl BackendError {
    pub fn rejected(operation: BackendOperation, status: u16, detail: Option<String>) -> Self {
        let message = detail
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| operation.fallback_message().to_string());
        BackendError::Rejected { status, message }
    }

    pub fn unreachable(operation: BackendOperation, cause: impl Into<String>) -> Self {
        BackendError::Unreachable {
            message: operation.fallback_message().to_string(),
            cause: cause.into(),
        }
    }

    pub fn invalid_response(operation: BackendOperation, cause: impl Into<String>) -> Self {
        BackendError::InvalidResponse {
            message: operation.fallback_message().to_string(),
            cause: cause.into(),
        }
    }

    /// An upload reply without a session id
    pub fn missing_session_id() -> Self {
        BackendError::InvalidResponse {
            message: "Upload failed: no session ID returned.".to_string(),
            cause: "session_id missing from upload response".to_string(),
        }
    }

    /// Text for the transient notice shown to the user
    pub fn user_message(&self) -> &str {
        match self {
            BackendError::Rejected { message, .. }
            | BackendError::Unreachable { message, .. }
            | BackendError::InvalidResponse { message, .. } => message,
        }
    }

    /// HTTP status, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Reply to an `ask` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskReply {
    /// The answer text; the backend may omit it or send it empty
    pub response: Option<String>,
}

impl AskReply {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.response.as_deref().is_none_or(str::is_empty)
    }
}

/// Gateway to the document question-answering backend
///
/// Implementations map failures to [`BackendError`] and never retry; a
/// failed call surfaces immediately to the caller.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Ingest a document and open a session for it
    async fn submit_document(
        &self,
        submission: &ValidatedSubmission,
    ) -> Result<SessionId, BackendError>;

    /// Ask a question about the session's document
    async fn ask(&self, session_id: &SessionId, prompt: &str) -> Result<AskReply, BackendError>;

    /// Release the session's backend resources
    async fn delete_session(&self, session_id: &SessionId) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_prefers_detail() {
        let error = BackendError::rejected(
            BackendOperation::Ask,
            429,
            Some("Rate limited".to_string()),
        );
        assert_eq!(error.user_message(), "Rate limited");
        assert_eq!(error.to_string(), "Rate limited");
        assert_eq!(error.status(), Some(429));
    }

    #[test]
    fn test_rejected_without_detail_uses_fallback() {
        let error = BackendError::rejected(BackendOperation::SubmitDocument, 500, None);
        assert_eq!(error.user_message(), "Upload failed.");

        let blank = BackendError::rejected(BackendOperation::Ask, 500, Some("  ".to_string()));
        assert_eq!(blank.user_message(), "Chat failed.");
    }

    #[test]
    fn test_unreachable_hides_cause() {
        let error = BackendError::unreachable(BackendOperation::Ask, "connection refused");
        assert_eq!(error.user_message(), "Chat failed.");
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_missing_session_id_message() {
        assert_eq!(
            BackendError::missing_session_id().user_message(),
            "Upload failed: no session ID returned."
        );
    }

    #[test]
    fn test_ask_reply_is_empty() {
        assert!(AskReply::default().is_empty());
        assert!(AskReply::new("").is_empty());
        assert!(!AskReply::new("A greeting.").is_empty());
    }
}
