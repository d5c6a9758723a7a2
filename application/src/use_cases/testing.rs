//! Test doubles shared by the use case tests.

use crate::ports::chat_events::{ChatEvent, ChatEventSink, Notice};
use crate::ports::document_backend::{
    AskReply, BackendError, BackendOperation, DocumentBackend,
};
use async_trait::async_trait;
use insight_domain::{SessionId, ValidatedSubmission};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// Upload, by source label
    Upload(String),
    Ask { session_id: String, prompt: String },
    Delete(String),
}

type AskScript = oneshot::Receiver<Result<AskReply, BackendError>>;

/// Backend answering from scripted queues and recording every call.
///
/// Ask replies are delivered through oneshot channels so a test can hold an
/// exchange in flight and settle it later.
#[derive(Default)]
pub struct ScriptedBackend {
    uploads: Mutex<VecDeque<Result<SessionId, BackendError>>>,
    asks: Mutex<VecDeque<AskScript>>,
    calls: Mutex<Vec<BackendCall>>,
    delete_fails: AtomicBool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_upload(&self, result: Result<SessionId, BackendError>) {
        self.uploads.lock().unwrap().push_back(result);
    }

    /// Script an ask reply that is available immediately
    pub fn push_ask(&self, result: Result<AskReply, BackendError>) {
        let (tx, rx) = oneshot::channel();
        tx.send(result).unwrap();
        self.asks.lock().unwrap().push_back(rx);
    }

    /// Script an ask reply the test settles through the returned sender
    pub fn push_pending_ask(&self) -> oneshot::Sender<Result<AskReply, BackendError>> {
        let (tx, rx) = oneshot::channel();
        self.asks.lock().unwrap().push_back(rx);
        tx
    }

    pub fn fail_deletes(&self) {
        self.delete_fails.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DocumentBackend for ScriptedBackend {
    async fn submit_document(
        &self,
        submission: &ValidatedSubmission,
    ) -> Result<SessionId, BackendError> {
        self.record(BackendCall::Upload(submission.source_label()));
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(BackendError::unreachable(
                    BackendOperation::SubmitDocument,
                    "unscripted",
                ))
            })
    }

    async fn ask(&self, session_id: &SessionId, prompt: &str) -> Result<AskReply, BackendError> {
        self.record(BackendCall::Ask {
            session_id: session_id.to_string(),
            prompt: prompt.to_string(),
        });
        let script = self.asks.lock().unwrap().pop_front();
        match script {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| {
                    Err(BackendError::unreachable(BackendOperation::Ask, "dropped"))
                }),
            None => Err(BackendError::unreachable(BackendOperation::Ask, "unscripted")),
        }
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), BackendError> {
        self.record(BackendCall::Delete(session_id.to_string()));
        if self.delete_fails.load(Ordering::SeqCst) {
            Err(BackendError::rejected(BackendOperation::DeleteSession, 500, None))
        } else {
            Ok(())
        }
    }
}

/// Sink that keeps every event it receives
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ChatEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .iter()
            .filter_map(|e| e.notice().cloned())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl ChatEventSink for RecordingSink {
    fn emit(&self, event: ChatEvent) {
        self.events.lock().unwrap().push(event);
    }
}
