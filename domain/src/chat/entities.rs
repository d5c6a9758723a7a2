//! Chat domain entities

use serde::{Deserialize, Serialize};

/// Text shown when the backend answers with nothing.
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "No response.";

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "AI",
        }
    }
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    /// A user prompt, trimmed.
    ///
    /// Returns `None` if nothing is left after trimming.
    pub fn user(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(Self {
                role: Role::User,
                text: text.to_string(),
            })
        }
    }

    /// An assistant answer; absent or empty text becomes the placeholder.
    pub fn assistant(text: Option<String>) -> Self {
        let text = text
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| EMPTY_RESPONSE_PLACEHOLDER.to_string());
        Self {
            role: Role::Assistant,
            text,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Ordered, append-only record of the messages exchanged in one chat view
///
/// Messages are never mutated or removed individually. [`Transcript::clear`]
/// discards everything and advances the epoch, so a caller holding an old
/// epoch can tell its transcript is gone.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    epoch: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Append a message, returning its index.
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Append only if the transcript has not been cleared since `epoch`.
    pub fn push_in_epoch(&mut self, epoch: u64, message: Message) -> Option<usize> {
        (self.epoch == epoch).then(|| self.push(message))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.epoch += 1;
    }
}
