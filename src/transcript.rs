//! The session transcript.
//!
//! An ordered list of [`ChatMessage`]s.  Insertion order is chronological
//! order is display order.  Nothing is validated on the way in: alternation
//! of user and assistant turns is a property of how [`crate::ChatSession`]
//! drives the transcript, not something the transcript enforces.

use std::slice;

use crate::types::{ApiMessage, ChatMessage};

/// Append-only (until cleared) message history for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message to the end.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Removes every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates messages in display order.
    pub fn iter(&self) -> slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }

    /// Returns the most recent message.
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Returns the messages as a slice.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The outbound payload: role and content of every message, in order.
    pub fn to_api_form(&self) -> impl ExactSizeIterator<Item = ApiMessage> + '_ {
        self.messages.iter().map(ChatMessage::to_api)
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a ChatMessage;
    type IntoIter = slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn sample() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.append(ChatMessage::user("Hello", "10:00:00"));
        transcript.append(ChatMessage::assistant("Hi there!", "10:00:02"));
        transcript.append(ChatMessage::user("How are you?", "10:00:09"));
        transcript
    }

    #[test]
    fn new_transcript_is_empty() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
        assert!(transcript.last().is_none());
    }

    #[test]
    fn append_keeps_order() {
        let transcript = sample();
        let contents: Vec<&str> = transcript.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Hello", "Hi there!", "How are you?"]);
        assert_eq!(transcript.last().map(|m| m.role), Some(Role::User));
    }

    #[test]
    fn append_does_not_dedup_or_validate() {
        let mut transcript = Transcript::new();
        transcript.append(ChatMessage::user("", "10:00:00"));
        transcript.append(ChatMessage::user("", "10:00:00"));
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn clear_resets_fully() {
        let mut transcript = sample();
        transcript.clear();
        assert_eq!(transcript.len(), 0);
        transcript.clear();
        assert!(transcript.is_empty());
    }

    #[test]
    fn api_form_strips_timestamps() {
        let transcript = sample();
        let api: Vec<ApiMessage> = transcript.to_api_form().collect();
        assert_eq!(api.len(), transcript.len());
        for (outbound, message) in api.iter().zip(transcript.iter()) {
            assert_eq!(outbound.role, message.role);
            assert_eq!(outbound.content, message.content);
            let json = serde_json::to_value(outbound).unwrap();
            assert!(json.get("timestamp").is_none());
        }
    }

    #[test]
    fn api_form_of_empty_transcript() {
        assert_eq!(Transcript::new().to_api_form().len(), 0);
    }
}
