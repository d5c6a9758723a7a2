//! Document submission value objects and their validation

use super::entities::RAW_TEXT_LABEL;
use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Media types the backend knows how to ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptedMediaType {
    Pdf,
    Docx,
    PlainText,
}

impl AcceptedMediaType {
    pub const ALL: [AcceptedMediaType; 3] = [
        AcceptedMediaType::Pdf,
        AcceptedMediaType::Docx,
        AcceptedMediaType::PlainText,
    ];

    /// The MIME type sent with the upload
    pub fn mime(&self) -> &'static str {
        match self {
            AcceptedMediaType::Pdf => "application/pdf",
            AcceptedMediaType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            AcceptedMediaType::PlainText => "text/plain",
        }
    }

    /// Match a declared media type against the accepted set.
    ///
    /// Parameters such as `; charset=utf-8` are ignored, as is case.
    pub fn from_mime(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.mime() == essence)
    }
}

impl fmt::Display for AcceptedMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A file attached to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    /// Media type as declared by the caller (not sniffed)
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// Raw user input for opening a session
///
/// Any combination of file, URL, and text may be supplied; at least one is
/// required. Empty strings count as not supplied; whitespace does not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSubmission {
    pub file: Option<UploadFile>,
    pub url: Option<String>,
    pub text: Option<String>,
}

impl DocumentSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: UploadFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.file.is_none() && non_empty(&self.url).is_none() && non_empty(&self.text).is_none()
    }

    /// Check the submission and produce something safe to send.
    ///
    /// Checks run in order: presence, file media type, URL scheme.
    pub fn validate(self) -> Result<ValidatedSubmission, ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::MissingInput);
        }

        let file = match self.file {
            Some(file) => {
                let media_type = AcceptedMediaType::from_mime(&file.media_type)
                    .ok_or_else(|| ValidationError::UnsupportedMediaType(file.media_type.clone()))?;
                Some(ValidatedFile { file, media_type })
            }
            None => None,
        };

        let url = non_empty(&self.url).map(str::to_string);
        if let Some(url) = &url
            && !is_web_url(url)
        {
            return Err(ValidationError::InvalidUrl(url.clone()));
        }

        let text = self.text.filter(|t| !t.is_empty());

        Ok(ValidatedSubmission { file, url, text })
    }
}

/// A file whose media type has been accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFile {
    pub file: UploadFile,
    pub media_type: AcceptedMediaType,
}

/// A submission that passed [`DocumentSubmission::validate`]
///
/// Only this type can be handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    file: Option<ValidatedFile>,
    url: Option<String>,
    text: Option<String>,
}

impl ValidatedSubmission {
    pub fn file(&self) -> Option<&ValidatedFile> {
        self.file.as_ref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Display label for the session: file name, else URL, else "Raw Text".
    pub fn source_label(&self) -> String {
        if let Some(f) = &self.file
            && !f.file.name.is_empty()
        {
            return f.file.name.clone();
        }
        match &self.url {
            Some(url) => url.clone(),
            None => RAW_TEXT_LABEL.to_string(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn is_web_url(candidate: &str) -> bool {
    match url::Url::parse(candidate) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
