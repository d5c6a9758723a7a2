//! Chat exchange use case.
//!
//! [`ChatExchangeEngine`] sends prompts for the active session and keeps the
//! transcript in order. One exchange may be in flight per session; a `send`
//! issued while that session is busy is ignored, so answers can never
//! interleave. An exchange left over from a terminated session does not
//! block the next one.
//!
//! A `send` runs in this order:
//! 1. append the user message (before the request goes out)
//! 2. clear the pending input and mark the session busy
//! 3. call the backend's `ask`
//! 4. append the answer, or emit an error notice and append nothing
//! 5. free the in-flight slot, whatever happened

use crate::ports::chat_events::{ChatEvent, ChatEventSink, Notice, View};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::document_backend::DocumentBackend;
use crate::use_cases::context::SessionContext;
use insight_domain::{Message, SessionId};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

const SESSION_MISSING: &str = "Session expired. Please re-upload.";

/// Why a `send` did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing left after trimming
    EmptyPrompt,
    /// Another exchange is in flight for this session
    Busy,
}

/// Result of [`ChatExchangeEngine::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The answer was appended to the transcript
    Answered(Message),
    /// The backend call failed; only the user message was appended
    Failed(String),
    /// No request was made
    Ignored(IgnoreReason),
    /// No session; the user was sent back to the submission view
    Redirected,
    /// The answer arrived after the transcript was discarded
    Discarded,
}

/// Identifies the exchange holding the in-flight slot.
///
/// The epoch changes whenever the transcript is discarded, so an exchange
/// from before a termination never matches one started after it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExchangeKey {
    session: SessionId,
    epoch: u64,
}

type InFlight = Mutex<Option<ExchangeKey>>;

fn lock_slot(slot: &InFlight) -> MutexGuard<'_, Option<ExchangeKey>> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

/// Frees the in-flight slot when an exchange ends, however it ends.
///
/// Only the exchange that still owns the slot frees it.
struct BusyGuard<'a> {
    slot: &'a InFlight,
    key: ExchangeKey,
    events: &'a dyn ChatEventSink,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut slot = lock_slot(self.slot);
        if slot.as_ref() != Some(&self.key) {
            return;
        }
        *slot = None;
        drop(slot);
        self.events.emit(ChatEvent::BusyChanged(false));
    }
}

/// Use case that exchanges prompts and answers for the active session.
pub struct ChatExchangeEngine {
    backend: Arc<dyn DocumentBackend>,
    context: SessionContext,
    in_flight: InFlight,
}

impl ChatExchangeEngine {
    pub fn new(backend: Arc<dyn DocumentBackend>, context: SessionContext) -> Self {
        Self {
            backend,
            context,
            in_flight: Mutex::new(None),
        }
    }

    /// Whether an exchange is in flight for the active session
    pub fn is_busy(&self) -> bool {
        let Some(session) = self.context.store.current() else {
            return false;
        };
        let epoch = self.context.transcript().epoch();
        lock_slot(&self.in_flight)
            .as_ref()
            .is_some_and(|key| key.epoch == epoch && &key.session == session.id())
    }

    /// Snapshot of the transcript, oldest first
    pub fn transcript(&self) -> Vec<Message> {
        self.context.transcript().messages().to_vec()
    }

    /// Send a prompt about the active session's document.
    pub async fn send(&self, prompt: &str) -> SendOutcome {
        let events = self.context.events.as_ref();

        let Some(session) = self.context.store.current() else {
            debug!("Send without a session; redirecting");
            events.emit(ChatEvent::Notice(Notice::error(SESSION_MISSING)));
            events.emit(ChatEvent::Navigate(View::Submission));
            return SendOutcome::Redirected;
        };

        let Some(user_message) = Message::user(prompt) else {
            return SendOutcome::Ignored(IgnoreReason::EmptyPrompt);
        };

        // Claim the slot and append under the transcript lock, so a
        // concurrent clear cannot slip in between.
        let claimed = {
            let mut transcript = self.context.transcript();
            let key = ExchangeKey {
                session: session.id().clone(),
                epoch: transcript.epoch(),
            };
            let mut slot = lock_slot(&self.in_flight);
            if slot.as_ref() == Some(&key) {
                None
            } else {
                *slot = Some(key.clone());
                Some((transcript.push(user_message.clone()), key))
            }
        };
        let Some((index, key)) = claimed else {
            debug!("Send ignored: session {} has an exchange in flight", session.id());
            return SendOutcome::Ignored(IgnoreReason::Busy);
        };
        let epoch = key.epoch;
        let _busy = BusyGuard {
            slot: &self.in_flight,
            key,
            events,
        };
        events.emit(ChatEvent::MessageAppended {
            index,
            message: user_message.clone(),
        });
        events.emit(ChatEvent::ScrollToLatest);
        events.emit(ChatEvent::InputCleared);
        events.emit(ChatEvent::BusyChanged(true));

        self.context.conversation_logger.log(ConversationEvent::new(
            "prompt",
            serde_json::json!({
                "session_id": session.id().as_str(),
                "text": user_message.text,
            }),
        ));

        info!("Asking session {} ({} chars)", session.id(), user_message.text.len());
        match self.backend.ask(session.id(), &user_message.text).await {
            Ok(reply) => {
                if reply.is_empty() {
                    warn!("Session {} returned an empty response", session.id());
                }
                let answer = Message::assistant(reply.response);
                let appended = self.context.transcript().push_in_epoch(epoch, answer.clone());
                let Some(index) = appended else {
                    debug!(
                        "Answer for session {} arrived after the transcript was discarded",
                        session.id()
                    );
                    return SendOutcome::Discarded;
                };

                events.emit(ChatEvent::MessageAppended {
                    index,
                    message: answer.clone(),
                });
                events.emit(ChatEvent::ScrollToLatest);

                self.context.conversation_logger.log(ConversationEvent::new(
                    "response",
                    serde_json::json!({
                        "session_id": session.id().as_str(),
                        "bytes": answer.text.len(),
                        "text": answer.text,
                    }),
                ));
                SendOutcome::Answered(answer)
            }
            Err(e) => {
                warn!("Ask failed for session {}: {:?}", session.id(), e);
                let message = e.user_message().to_string();
                events.emit(ChatEvent::Notice(Notice::error(message.clone())));

                self.context.conversation_logger.log(ConversationEvent::new(
                    "chat_failed",
                    serde_json::json!({
                        "session_id": session.id().as_str(),
                        "status": e.status(),
                        "error": message,
                    }),
                ));
                SendOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::document_backend::{AskReply, BackendError, BackendOperation};
    use crate::ports::scheduler::ManualScheduler;
    use crate::ports::session_store::{InMemorySessionStore, SessionStore};
    use crate::use_cases::session_lifecycle::SessionLifecycleController;
    use crate::use_cases::testing::{BackendCall, RecordingSink, ScriptedBackend};
    use insight_domain::{DocumentSubmission, Role, Session, SessionId, TerminationReason};

    struct Harness {
        backend: Arc<ScriptedBackend>,
        sink: Arc<RecordingSink>,
        engine: Arc<ChatExchangeEngine>,
        context: SessionContext,
    }

    fn harness_with(store: InMemorySessionStore) -> Harness {
        let backend = Arc::new(ScriptedBackend::new());
        let sink = Arc::new(RecordingSink::new());
        let context = SessionContext::new(Arc::new(store), sink.clone());
        let engine = Arc::new(ChatExchangeEngine::new(backend.clone(), context.clone()));
        Harness {
            backend,
            sink,
            engine,
            context,
        }
    }

    fn active_harness() -> Harness {
        harness_with(InMemorySessionStore::with_session(Session::new(
            SessionId::new("abc123"),
            "Raw Text",
        )))
    }

    fn roles(engine: &ChatExchangeEngine) -> Vec<Role> {
        engine.transcript().iter().map(|m| m.role).collect()
    }

    #[tokio::test]
    async fn test_successful_exchange_appends_both_messages() {
        let h = active_harness();
        h.backend.push_ask(Ok(AskReply::new("A greeting.")));

        let outcome = h.engine.send("  What is this?  ").await;

        assert_eq!(
            outcome,
            SendOutcome::Answered(Message::assistant(Some("A greeting.".to_string())))
        );
        let transcript = h.engine.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].text, "What is this?");
        assert_eq!(transcript[1].text, "A greeting.");
        assert_eq!(roles(&h.engine), vec![Role::User, Role::Assistant]);
        assert_eq!(
            h.backend.calls(),
            vec![BackendCall::Ask {
                session_id: "abc123".to_string(),
                prompt: "What is this?".to_string(),
            }]
        );
        assert!(!h.engine.is_busy());
    }

    #[tokio::test]
    async fn test_event_order_for_exchange() {
        let h = active_harness();
        h.backend.push_ask(Ok(AskReply::new("A1")));
        h.engine.send("Q1").await;

        let user = Message::user("Q1").unwrap();
        let answer = Message::assistant(Some("A1".to_string()));
        assert_eq!(
            h.sink.events(),
            vec![
                ChatEvent::MessageAppended { index: 0, message: user },
                ChatEvent::ScrollToLatest,
                ChatEvent::InputCleared,
                ChatEvent::BusyChanged(true),
                ChatEvent::MessageAppended { index: 1, message: answer },
                ChatEvent::ScrollToLatest,
                ChatEvent::BusyChanged(false),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_prompt_is_noop() {
        let h = active_harness();
        assert_eq!(
            h.engine.send("   ").await,
            SendOutcome::Ignored(IgnoreReason::EmptyPrompt)
        );
        assert!(h.engine.transcript().is_empty());
        assert!(h.backend.calls().is_empty());
        assert!(h.sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_send_without_session_redirects() {
        let h = harness_with(InMemorySessionStore::new());
        assert_eq!(h.engine.send("hello").await, SendOutcome::Redirected);

        assert!(h.engine.transcript().is_empty());
        assert!(h.backend.calls().is_empty());
        assert_eq!(
            h.sink.events(),
            vec![
                ChatEvent::Notice(Notice::error("Session expired. Please re-upload.")),
                ChatEvent::Navigate(View::Submission),
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_user_message_and_notifies() {
        let h = active_harness();
        h.backend.push_ask(Err(BackendError::rejected(
            BackendOperation::Ask,
            429,
            Some("Rate limited".to_string()),
        )));

        let outcome = h.engine.send("Q1").await;

        assert_eq!(outcome, SendOutcome::Failed("Rate limited".to_string()));
        assert_eq!(roles(&h.engine), vec![Role::User]);
        assert_eq!(h.sink.notices(), vec![Notice::error("Rate limited")]);
        assert!(!h.engine.is_busy());
        assert_eq!(h.sink.events().last(), Some(&ChatEvent::BusyChanged(false)));
    }

    #[tokio::test]
    async fn test_failure_without_detail_uses_fallback() {
        let h = active_harness();
        h.backend.push_ask(Err(BackendError::unreachable(
            BackendOperation::Ask,
            "connection reset",
        )));

        assert_eq!(
            h.engine.send("Q1").await,
            SendOutcome::Failed("Chat failed.".to_string())
        );
        assert_eq!(h.sink.notices(), vec![Notice::error("Chat failed.")]);
    }

    #[tokio::test]
    async fn test_empty_response_becomes_placeholder() {
        let h = active_harness();
        h.backend.push_ask(Ok(AskReply::default()));
        h.backend.push_ask(Ok(AskReply::new("")));

        h.engine.send("Q1").await;
        h.engine.send("Q2").await;

        let texts: Vec<_> = h.engine.transcript().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["Q1", "No response.", "Q2", "No response."]);
    }

    #[tokio::test]
    async fn test_second_send_while_in_flight_is_ignored() {
        let h = active_harness();
        let first = h.backend.push_pending_ask();
        h.backend.push_ask(Ok(AskReply::new("A2")));

        let engine = h.engine.clone();
        let in_flight = tokio::spawn(async move { engine.send("Q1").await });
        while !h.engine.is_busy() {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            h.engine.send("Q2").await,
            SendOutcome::Ignored(IgnoreReason::Busy)
        );
        assert_eq!(h.engine.transcript().len(), 1);

        first.send(Ok(AskReply::new("A1"))).unwrap();
        assert!(matches!(in_flight.await.unwrap(), SendOutcome::Answered(_)));

        // Q2 was dropped, not queued: the next send goes through normally.
        h.engine.send("Q3").await;
        let texts: Vec<_> = h.engine.transcript().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["Q1", "A1", "Q3", "A2"]);
    }

    #[tokio::test]
    async fn test_pending_answer_does_not_block_next_session() {
        let h = active_harness();
        let stale = h.backend.push_pending_ask();
        h.backend.push_upload(Ok(SessionId::new("def456")));
        let current = h.backend.push_pending_ask();
        let controller = Arc::new(SessionLifecycleController::new(
            h.backend.clone(),
            Arc::new(ManualScheduler::new()),
            h.context.clone(),
        ));

        let engine = h.engine.clone();
        let on_first = tokio::spawn(async move { engine.send("Q on A").await });
        while !h.engine.is_busy() {
            tokio::task::yield_now().await;
        }

        assert!(controller.terminate(TerminationReason::Explicit));
        assert!(!h.engine.is_busy());
        controller
            .create(DocumentSubmission::new().with_text("second document"))
            .await
            .unwrap();
        controller.validate_on_entry().unwrap();

        let engine = h.engine.clone();
        let on_second = tokio::spawn(async move { engine.send("Q on B").await });
        while !h.engine.is_busy() {
            tokio::task::yield_now().await;
        }
        assert!(h.backend.calls().contains(&BackendCall::Ask {
            session_id: "def456".to_string(),
            prompt: "Q on B".to_string(),
        }));

        // The stale exchange settling must not free the new session's slot.
        stale.send(Ok(AskReply::new("late"))).unwrap();
        assert_eq!(on_first.await.unwrap(), SendOutcome::Discarded);
        assert!(h.engine.is_busy());
        assert_eq!(
            h.engine.send("again").await,
            SendOutcome::Ignored(IgnoreReason::Busy)
        );

        current.send(Ok(AskReply::new("Answer on B"))).unwrap();
        assert!(matches!(on_second.await.unwrap(), SendOutcome::Answered(_)));
        assert!(!h.engine.is_busy());
        let texts: Vec<_> = h.engine.transcript().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["Q on B", "Answer on B"]);
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn test_late_answer_after_termination_is_discarded() {
        let h = active_harness();
        let pending = h.backend.push_pending_ask();
        let controller = SessionLifecycleController::new(
            h.backend.clone(),
            Arc::new(ManualScheduler::new()),
            h.context.clone(),
        );

        let engine = h.engine.clone();
        let in_flight = tokio::spawn(async move { engine.send("Q1").await });
        while !h.engine.is_busy() {
            tokio::task::yield_now().await;
        }

        assert!(controller.terminate(TerminationReason::Explicit));
        pending.send(Ok(AskReply::new("too late"))).unwrap();

        assert_eq!(in_flight.await.unwrap(), SendOutcome::Discarded);
        assert!(h.engine.transcript().is_empty());
        assert!(!h.engine.is_busy());
        controller.shutdown().await;
    }

    // ==================== End-to-end scenarios ====================

    #[tokio::test]
    async fn test_scenario_raw_text_session_round_trip() {
        let backend = Arc::new(ScriptedBackend::new());
        let sink = Arc::new(RecordingSink::new());
        let store = Arc::new(InMemorySessionStore::new());
        let context = SessionContext::new(store.clone(), sink.clone());
        let controller = Arc::new(SessionLifecycleController::new(
            backend.clone(),
            Arc::new(ManualScheduler::new()),
            context.clone(),
        ));
        let engine = ChatExchangeEngine::new(backend.clone(), context);

        backend.push_upload(Ok(SessionId::new("abc123")));
        backend.push_ask(Ok(AskReply::new("A greeting.")));

        let session = controller
            .create(DocumentSubmission::new().with_text("hello world"))
            .await
            .unwrap();
        assert_eq!(session.id().as_str(), "abc123");
        assert_eq!(session.source_label(), "Raw Text");

        sink.clear();
        controller.validate_on_entry().unwrap();
        assert!(!sink.events().contains(&ChatEvent::Navigate(View::Submission)));

        engine.send("What is this?").await;
        let transcript = engine.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0], Message::user("What is this?").unwrap());
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].text, "A greeting.");
        assert!(store.has_session());
    }

    #[tokio::test]
    async fn test_scenario_entry_without_session() {
        let backend = Arc::new(ScriptedBackend::new());
        let sink = Arc::new(RecordingSink::new());
        let context = SessionContext::new(Arc::new(InMemorySessionStore::new()), sink.clone());
        let controller = Arc::new(SessionLifecycleController::new(
            backend.clone(),
            Arc::new(ManualScheduler::new()),
            context.clone(),
        ));
        let engine = ChatExchangeEngine::new(backend.clone(), context);

        assert!(controller.validate_on_entry().is_err());
        assert_eq!(sink.events(), vec![ChatEvent::Navigate(View::Submission)]);
        assert!(engine.transcript().is_empty());
        assert!(backend.calls().is_empty());
    }
}
