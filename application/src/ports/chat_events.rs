//! Chat event port
//!
//! Events flow from the use cases to whatever renders them. The use cases
//! never block on a renderer: [`ChatEventSink::emit`] is synchronous and
//! infallible.

use insight_domain::Message;
use tokio::sync::mpsc;

/// Screens the user can be on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Document submission form
    Submission,
    /// Conversation about the submitted document
    Chat,
}

/// Severity of a transient notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short-lived message for the user (a toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Events emitted by the session use cases for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Show a transient notice
    Notice(Notice),
    /// Switch to another view
    Navigate(View),
    /// A message was appended to the transcript at `index`
    MessageAppended { index: usize, message: Message },
    /// Bring the newest transcript entry into view
    ScrollToLatest,
    /// The pending prompt input was consumed
    InputCleared,
    /// An exchange started or finished
    BusyChanged(bool),
    /// The transcript was discarded
    TranscriptCleared,
}

impl ChatEvent {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            ChatEvent::Notice(notice) => Some(notice),
            _ => None,
        }
    }
}

/// Receiver of [`ChatEvent`]s
pub trait ChatEventSink: Send + Sync {
    fn emit(&self, event: ChatEvent);
}

/// Sink that drops every event
pub struct NoChatEvents;

impl ChatEventSink for NoChatEvents {
    fn emit(&self, _event: ChatEvent) {}
}

/// Events are forwarded to a channel; a closed channel drops them.
impl ChatEventSink for mpsc::UnboundedSender<ChatEvent> {
    fn emit(&self, event: ChatEvent) {
        let _ = self.send(event);
    }
}
