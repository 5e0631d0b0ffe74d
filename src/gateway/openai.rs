//! OpenAI chat-completions dialect.
//!
//! Spoken by OpenAI itself and by every OpenAI-compatible provider the
//! gateway routes to (GitHub Models, Groq, Mistral, Ollama, ...).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gateway::CompletionRequest;
use crate::types::ApiMessage;

/// Endpoint path relative to the provider base.
pub(crate) const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ApiMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

impl<'a> ChatCompletionBody<'a> {
    pub(crate) fn new(model: &'a str, request: &'a CompletionRequest) -> Self {
        Self {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extracts the first choice's text from a successful response body.
pub(crate) fn parse_reply(body: &str) -> Result<String> {
    let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        Error::serialization(
            format!("Failed to parse response: {}", e),
            Some(Box::new(e)),
        )
    })?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::serialization("response contained no message content", None))
}
