//! Submission form state

use insight_domain::{DocumentSubmission, UploadFile};
use std::io;
use std::path::Path;

/// What the user has entered in the submission view so far
#[derive(Debug, Default, Clone)]
pub struct SubmissionForm {
    file: Option<UploadFile>,
    url: Option<String>,
    text: String,
}

impl SubmissionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file from disk and attach it.
    ///
    /// The media type is guessed from the extension; unsupported types are
    /// rejected on upload, not here.
    pub async fn attach_file(&mut self, path: &Path) -> io::Result<&UploadFile> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(self.file.insert(UploadFile::new(name, media_type, bytes)))
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = Some(url.to_string());
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn append_text(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.name.as_str())
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn text_chars(&self) -> usize {
        self.text.trim().chars().count()
    }

    pub fn to_submission(&self) -> DocumentSubmission {
        DocumentSubmission {
            file: self.file.clone(),
            url: self.url.clone(),
            text: (!self.text.is_empty()).then(|| self.text.clone()),
        }
    }
}
