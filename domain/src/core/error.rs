//! Domain error types

use thiserror::Error;

/// Reasons a document submission is rejected before it reaches the backend.
///
/// The display strings are user-facing and shown inline on the submission view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide a file, URL, or text.")]
    MissingInput,

    #[error("Invalid file type. Only PDF, DOCX, and TXT.")]
    UnsupportedMediaType(String),

    #[error("Invalid URL. Must start with http:// or https://")]
    InvalidUrl(String),
}

impl ValidationError {
    /// Check if this error is about the attached file
    pub fn is_file_error(&self) -> bool {
        matches!(self, ValidationError::UnsupportedMediaType(_))
    }
}
