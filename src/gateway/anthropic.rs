//! Anthropic Messages dialect.
//!
//! System messages are not part of the `messages` array here; they are lifted
//! into the top-level `system` field, joined by blank lines.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gateway::CompletionRequest;
use crate::types::{ApiMessage, Role};

/// Endpoint path relative to the provider base.
pub(crate) const MESSAGES_PATH: &str = "messages";

/// Value of the `anthropic-version` header.
pub(crate) const ANTHROPIC_API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
pub(crate) struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<&'a ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    temperature: f32,
}

impl<'a> MessagesBody<'a> {
    pub(crate) fn new(model: &'a str, request: &'a CompletionRequest) -> Self {
        let (system, messages): (Vec<&ApiMessage>, Vec<&ApiMessage>) = request
            .messages
            .iter()
            .partition(|message| message.role == Role::System);
        let system = if system.is_empty() {
            None
        } else {
            Some(
                system
                    .iter()
                    .map(|message| message.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            )
        };
        Self {
            model,
            max_tokens: request.max_tokens,
            messages,
            system,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Concatenates the text blocks of a successful response body.
pub(crate) fn parse_reply(body: &str) -> Result<String> {
    let response: MessagesResponse = serde_json::from_str(body).map_err(|e| {
        Error::serialization(
            format!("Failed to parse response: {}", e),
            Some(Box::new(e)),
        )
    })?;
    let texts: Vec<String> = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();
    if texts.is_empty() {
        return Err(Error::serialization(
            "response contained no message content",
            None,
        ));
    }
    Ok(texts.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn system_messages_are_lifted() {
        let request = CompletionRequest::new(
            vec![
                ApiMessage::system("Be brief."),
                ApiMessage::user("Hello"),
                ApiMessage::assistant("Hi"),
                ApiMessage::system("Use English."),
                ApiMessage::user("Bye"),
            ],
            "claude-3-haiku-20240307",
            "sk-ant-test",
        );
        let value = to_value(MessagesBody::new("claude-3-haiku-20240307", &request)).unwrap();
        assert_eq!(value["system"], json!("Be brief.\n\nUse English."));
        assert_eq!(
            value["messages"],
            json!([
                {"role": "user", "content": "Hello"},
                {"role": "assistant", "content": "Hi"},
                {"role": "user", "content": "Bye"}
            ])
        );
        assert_eq!(value["max_tokens"], json!(1000));
    }

    #[test]
    fn no_system_field_without_system_messages() {
        let request = CompletionRequest::new(vec![ApiMessage::user("Hello")], "claude-x", "k");
        let value = to_value(MessagesBody::new("claude-x", &request)).unwrap();
        assert!(value.get("system").is_none());
    }

    #[test]
    fn parse_text_blocks() {
        let body = r#"{
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "Hi "},
                {"type": "text", "text": "there!"}
            ],
            "stop_reason": "end_turn"
        }"#;
        assert_eq!(parse_reply(body).unwrap(), "Hi there!");
    }

    #[test]
    fn no_text_is_an_error() {
        assert!(parse_reply(r#"{"content": []}"#).is_err());
    }
}
