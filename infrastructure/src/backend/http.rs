//! HTTP client for the InsightAI backend.

use super::wire::{ChatRequest, ChatResponse, ErrorBody, UploadResponse};
use async_trait::async_trait;
use insight_application::{AskReply, BackendError, BackendOperation, DocumentBackend};
use insight_domain::{SessionId, ValidatedSubmission};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::debug;

/// [`DocumentBackend`] over HTTP.
///
/// Every call is a single request. Non-2xx answers become
/// [`BackendError::Rejected`] carrying the backend's `detail` when present;
/// nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpDocumentBackend {
    base_url: String,
    http: Client,
}

impl HttpDocumentBackend {
    /// Create a client for the given base URL.
    ///
    /// Example: `HttpDocumentBackend::new("http://localhost:8000")`
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Create a client whose requests time out after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn upload_form(submission: &ValidatedSubmission) -> Result<Form, BackendError> {
        let mut form = Form::new();
        if let Some(upload) = submission.file() {
            let part = Part::bytes(upload.file.bytes.clone())
                .file_name(upload.file.name.clone())
                .mime_str(upload.media_type.mime())
                .map_err(|e| {
                    BackendError::invalid_response(BackendOperation::SubmitDocument, e.to_string())
                })?;
            form = form.part("file", part);
        }
        if let Some(url) = submission.url() {
            form = form.text("url", url.to_string());
        }
        if let Some(text) = submission.text() {
            form = form.text("text", text.to_string());
        }
        Ok(form)
    }

    /// Turn a non-2xx response into a [`BackendError`].
    async fn rejection(operation: BackendOperation, response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail_text(),
            Err(_) => None,
        };
        debug!("{} rejected with HTTP {}: {:?}", operation.as_str(), status, detail);
        BackendError::rejected(operation, status, detail)
    }

    fn unreachable(operation: BackendOperation, error: reqwest::Error) -> BackendError {
        debug!("{} failed to reach backend: {}", operation.as_str(), error);
        BackendError::unreachable(operation, error.to_string())
    }
}

#[async_trait]
impl DocumentBackend for HttpDocumentBackend {
    async fn submit_document(
        &self,
        submission: &ValidatedSubmission,
    ) -> Result<SessionId, BackendError> {
        let op = BackendOperation::SubmitDocument;
        let form = Self::upload_form(submission)?;

        let response = self
            .http
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::unreachable(op, e))?;

        if !response.status().is_success() {
            return Err(Self::rejection(op, response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| BackendError::invalid_response(op, e.to_string()))?;

        body.session_id
            .filter(|id| !id.is_empty())
            .map(SessionId::new)
            .ok_or_else(BackendError::missing_session_id)
    }

    async fn ask(&self, session_id: &SessionId, prompt: &str) -> Result<AskReply, BackendError> {
        let op = BackendOperation::Ask;
        let body = ChatRequest {
            session_id: session_id.as_str(),
            prompt,
        };

        let response = self
            .http
            .post(self.endpoint("/chat"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::unreachable(op, e))?;

        if !response.status().is_success() {
            return Err(Self::rejection(op, response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::invalid_response(op, e.to_string()))?;
        Ok(AskReply {
            response: body.response,
        })
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), BackendError> {
        let op = BackendOperation::DeleteSession;
        let response = self
            .http
            .delete(self.endpoint("/delete-session"))
            .query(&[("session_id", session_id.as_str())])
            .send()
            .await
            .map_err(|e| Self::unreachable(op, e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejection(op, response).await)
        }
    }
}
