use serde::{Deserialize, Serialize};

use crate::types::{ApiMessage, Role};

/// A message as it lives in the transcript.
///
/// The timestamp is a wall-clock `HH:MM:SS` caption for display and never
/// leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// The role of the message.
    pub role: Role,

    /// The text of the message.
    pub content: String,

    /// Wall-clock time of creation, `HH:MM:SS`.
    pub timestamp: String,
}

impl ChatMessage {
    /// Create a new `ChatMessage`.
    pub fn new(role: Role, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Create a user message stamped with `timestamp`.
    pub fn user(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self::new(Role::User, content, timestamp)
    }

    /// Create an assistant message stamped with `timestamp`.
    pub fn assistant(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, timestamp)
    }

    /// Strip the timestamp, producing the outbound form.
    pub fn to_api(&self) -> ApiMessage {
        ApiMessage::new(self.role, self.content.clone())
    }
}

impl From<&ChatMessage> for ApiMessage {
    fn from(message: &ChatMessage) -> Self {
        message.to_api()
    }
}
