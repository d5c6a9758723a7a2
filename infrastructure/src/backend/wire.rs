//! JSON shapes exchanged with the backend

use serde::{Deserialize, Serialize};

/// Body of a successful `POST /upload`
#[derive(Debug, Deserialize)]
pub(super) struct UploadResponse {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body of `POST /chat`
#[derive(Debug, Serialize)]
pub(super) struct ChatRequest<'a> {
    pub session_id: &'a str,
    pub prompt: &'a str,
}

/// Body of a successful `POST /chat`
#[derive(Debug, Deserialize)]
pub(super) struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
}

/// Error body; FastAPI puts a string here, or a list for validation errors
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The detail, if it is a plain string
    pub fn detail_text(self) -> Option<String> {
        match self.detail {
            Some(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }
}
