//! Session lifecycle use case.
//!
//! [`SessionLifecycleController`] owns the session state machine:
//!
//! ```text
//! NoSession --create--> Active --terminate--> Terminating --> NoSession
//! ```
//!
//! It is the only writer of the [`SessionStore`](crate::ports::session_store::SessionStore).
//! Termination takes the session out of the store atomically, so concurrent
//! terminations (idle expiry racing an explicit "end chat") delete at most once.

use crate::config::SessionConfig;
use crate::ports::chat_events::{ChatEvent, Notice, View};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::document_backend::{BackendError, DocumentBackend};
use crate::ports::scheduler::Scheduler;
use crate::use_cases::activity_monitor::ActivityMonitor;
use crate::use_cases::context::SessionContext;
use futures::FutureExt;
use insight_domain::{
    ActivitySignal, DocumentSubmission, LifecycleState, Session, SessionId, TerminationReason,
    ValidationError,
};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

const UPLOAD_SUCCEEDED: &str = "Uploaded! Redirecting...";
const SESSION_EXPIRED: &str = "Session expired due to inactivity.";

/// Errors that can occur while opening a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateSessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// The chat view was entered without an active session.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("No active session")]
pub struct NoActiveSession;

/// Use case that creates, validates and tears down sessions.
pub struct SessionLifecycleController {
    backend: Arc<dyn DocumentBackend>,
    scheduler: Arc<dyn Scheduler>,
    context: SessionContext,
    config: SessionConfig,
    state: Mutex<LifecycleState>,
    monitor: Mutex<Option<ActivityMonitor>>,
    deletes: TaskTracker,
}

impl SessionLifecycleController {
    pub fn new(
        backend: Arc<dyn DocumentBackend>,
        scheduler: Arc<dyn Scheduler>,
        context: SessionContext,
    ) -> Self {
        let state = if context.store.has_session() {
            LifecycleState::Active
        } else {
            LifecycleState::NoSession
        };
        Self {
            backend,
            scheduler,
            context,
            config: SessionConfig::default(),
            state: Mutex::new(state),
            monitor: Mutex::new(None),
            deletes: TaskTracker::new(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> LifecycleState {
        *self.lock_state()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.context.store.current()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Validate a submission, hand it to the backend and store the new session.
    ///
    /// Invalid submissions never reach the backend. On any failure the
    /// machine stays where it was and an error notice is emitted.
    pub async fn create(
        &self,
        submission: DocumentSubmission,
    ) -> Result<Session, CreateSessionError> {
        let validated = match submission.validate() {
            Ok(validated) => validated,
            Err(e) => {
                debug!("Submission rejected: {}", e);
                self.emit(ChatEvent::Notice(Notice::error(e.to_string())));
                return Err(e.into());
            }
        };

        let source_label = validated.source_label();
        info!("Submitting document: {}", source_label);

        let session_id = match self.backend.submit_document(&validated).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Document submission failed: {:?}", e);
                self.emit(ChatEvent::Notice(Notice::error(e.user_message())));
                return Err(e.into());
            }
        };

        let session = Session::new(session_id, source_label);
        if let Some(previous) = self.context.store.replace(session.clone()) {
            debug!("Session {} replaced by {}", previous.id(), session.id());
        }
        self.set_state(LifecycleState::Active);
        info!("Session {} opened for {}", session.id(), session.source_label());

        self.context.conversation_logger.log(ConversationEvent::new(
            "session_created",
            serde_json::json!({
                "session_id": session.id().as_str(),
                "source": session.source_label(),
            }),
        ));

        self.emit(ChatEvent::Notice(Notice::success(UPLOAD_SUCCEEDED)));
        self.emit(ChatEvent::Navigate(View::Chat));
        Ok(session)
    }

    /// Called when the chat view becomes visible.
    ///
    /// Without a session the user is sent back to the submission view,
    /// without a notice. With one, the activity monitor is armed.
    pub fn validate_on_entry(self: &Arc<Self>) -> Result<Session, NoActiveSession> {
        let Some(session) = self.context.store.current() else {
            debug!("Chat view entered without a session; redirecting");
            self.emit(ChatEvent::Navigate(View::Submission));
            return Err(NoActiveSession);
        };

        self.set_state(LifecycleState::Active);

        let controller = Arc::downgrade(self);
        let monitor = ActivityMonitor::new(
            self.scheduler.clone(),
            self.config.idle_timeout,
            move || {
                let controller = controller.clone();
                async move {
                    if let Some(controller) = controller.upgrade() {
                        controller.terminate(TerminationReason::IdleTimeout);
                    }
                }
                .boxed()
            },
        );
        monitor.start();

        // Replacing drops (and stops) a monitor left from an earlier entry.
        *self.lock_monitor() = Some(monitor);
        Ok(session)
    }

    /// Forward a user-activity signal to the idle countdown.
    ///
    /// Returns `false` when no countdown is running.
    pub fn record_activity(&self, signal: ActivitySignal) -> bool {
        self.lock_monitor()
            .as_ref()
            .is_some_and(|monitor| monitor.record(signal))
    }

    pub fn is_monitoring(&self) -> bool {
        self.lock_monitor()
            .as_ref()
            .is_some_and(|monitor| monitor.is_armed())
    }

    /// Tear down the active session.
    ///
    /// Returns `false` (and does nothing) when there is no session, which
    /// makes repeated or racing calls harmless. The backend delete is
    /// dispatched without waiting; its failure is only logged.
    pub fn terminate(&self, reason: TerminationReason) -> bool {
        let Some(session) = self.context.store.take() else {
            debug!("Terminate ({}) ignored: no active session", reason);
            return false;
        };

        self.set_state(LifecycleState::Terminating);
        self.stop_monitor();
        self.dispatch_delete(session.id().clone());
        self.clear_transcript();
        self.set_state(LifecycleState::NoSession);

        info!("Session {} terminated ({})", session.id(), reason);
        self.context.conversation_logger.log(ConversationEvent::new(
            "session_terminated",
            serde_json::json!({
                "session_id": session.id().as_str(),
                "reason": reason.as_str(),
            }),
        ));

        if reason == TerminationReason::IdleTimeout {
            self.emit(ChatEvent::Notice(Notice::error(SESSION_EXPIRED)));
        }
        if reason.returns_to_submission() {
            self.emit(ChatEvent::Navigate(View::Submission));
        }
        true
    }

    /// Leave the chat view without ending the backend session.
    pub fn leave_chat_view(&self) {
        self.stop_monitor();
        self.clear_transcript();
    }

    /// Wait for dispatched best-effort deletes to settle.
    pub async fn shutdown(&self) {
        self.deletes.close();
        self.deletes.wait().await;
        self.deletes.reopen();
    }

    fn dispatch_delete(&self, session_id: SessionId) {
        let backend = self.backend.clone();
        self.deletes.spawn(async move {
            match backend.delete_session(&session_id).await {
                Ok(()) => debug!("Session {} deleted", session_id),
                Err(e) => debug!("Best-effort delete of {} failed: {:?}", session_id, e),
            }
        });
    }

    fn stop_monitor(&self) {
        if let Some(monitor) = self.lock_monitor().take() {
            monitor.stop();
        }
    }

    fn clear_transcript(&self) {
        self.context.transcript().clear();
        self.emit(ChatEvent::TranscriptCleared);
    }

    fn emit(&self, event: ChatEvent) {
        self.context.events.emit(event);
    }

    fn set_state(&self, next: LifecycleState) {
        let mut state = self.lock_state();
        if *state != next {
            debug!("Lifecycle {} -> {}", state.as_str(), next.as_str());
            *state = next;
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_monitor(&self) -> MutexGuard<'_, Option<ActivityMonitor>> {
        self.monitor.lock().unwrap_or_else(|e| e.into_inner())
    }
}
