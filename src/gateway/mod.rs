//! The completion gateway.
//!
//! One call in, one reply out.  [`get_response`] sends an ordered message
//! sequence to whatever provider the model string routes to and never fails:
//! anything that goes wrong comes back as [`Reply::Failed`], which renders as
//! `Error: <message>` when stored in the transcript.
//!
//! - [`provider`]: model string to provider routing
//! - [`HttpGateway`]: the reqwest-backed implementation

mod anthropic;
mod client;
mod openai;
pub mod provider;

use std::time::Instant;

use crate::error::{Error, Result};
use crate::observability::{GATEWAY_ERRORS, GATEWAY_REQUEST_DURATION, GATEWAY_REQUESTS};
use crate::types::ApiMessage;

pub use client::HttpGateway;
pub use provider::{Dialect, ModelRoute, POPULAR_MODELS, Provider};

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.7;

/// Output token cap sent with every request.
pub const MAX_TOKENS: u32 = 1000;

/// Everything a provider needs for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Free-form model string, possibly `provider/`-prefixed.
    pub model: String,
    /// Conversation so far, oldest first.
    pub messages: Vec<ApiMessage>,
    /// Credential for the provider.
    pub api_key: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum output tokens.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Builds a request with the fixed sampling parameters.
    pub fn new(
        messages: impl IntoIterator<Item = ApiMessage>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            messages: messages.into_iter().collect(),
            api_key: api_key.into(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// A backend able to turn a [`CompletionRequest`] into reply text.
///
/// Implementations return `Err` freely; [`get_response`] is the boundary that
/// converts those into [`Reply::Failed`].
#[async_trait::async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Performs one non-streaming completion and returns the reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait::async_trait]
impl<G: CompletionGateway + ?Sized> CompletionGateway for Box<G> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request).await
    }
}

/// Outcome of one gateway call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// The provider answered.
    Content(String),
    /// The call failed.
    Failed(Error),
}

impl Reply {
    /// Returns true if the call failed.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Failed(_))
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&Error> {
        match self {
            Reply::Content(_) => None,
            Reply::Failed(err) => Some(err),
        }
    }

    /// The text shown as the assistant's message.
    pub fn text(&self) -> String {
        match self {
            Reply::Content(text) => text.clone(),
            Reply::Failed(err) => format!("Error: {err}"),
        }
    }
}

impl From<Result<String>> for Reply {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => Reply::Content(text),
            Err(err) => Reply::Failed(err),
        }
    }
}

/// Sends `messages` to `model` using `api_key` and returns the reply.
///
/// Exactly one request is made: no retry and no backoff.
pub async fn get_response<G: CompletionGateway + ?Sized>(
    gateway: &G,
    messages: impl IntoIterator<Item = ApiMessage>,
    model: &str,
    api_key: &str,
) -> Reply {
    let request = CompletionRequest::new(messages, model, api_key);
    GATEWAY_REQUESTS.click();
    let started = Instant::now();
    let reply = Reply::from(gateway.complete(&request).await);
    GATEWAY_REQUEST_DURATION.add(started.elapsed().as_secs_f64());

    if let Reply::Failed(err) = &reply {
        GATEWAY_ERRORS.click();
        if err.is_retryable() {
            tracing::warn!(model, error = %err, "completion failed");
        } else {
            tracing::info!(model, error = %err, "completion failed");
        }
    } else {
        tracing::debug!(model, elapsed = ?started.elapsed(), "completion succeeded");
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        seen: Mutex<Vec<CompletionRequest>>,
        outcome: Result<String>,
    }

    impl Recording {
        fn new(outcome: Result<String>) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                outcome,
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionGateway for Recording {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn success_returns_content() {
        let gateway = Recording::new(Ok("Hi there!".to_string()));
        let reply = get_response(&gateway, vec![ApiMessage::user("Hello")], "gpt-4", "sk").await;
        assert!(!reply.is_error());
        assert_eq!(reply.text(), "Hi there!");
    }

    #[tokio::test]
    async fn request_carries_fixed_parameters() {
        let gateway = Recording::new(Ok(String::new()));
        get_response(
            &gateway,
            vec![ApiMessage::user("Hello"), ApiMessage::assistant("Hi")],
            "github/Phi-4",
            "ghp_test",
        )
        .await;
        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "github/Phi-4");
        assert_eq!(seen[0].api_key, "ghp_test");
        assert_eq!(seen[0].temperature, 0.7);
        assert_eq!(seen[0].max_tokens, 1000);
        assert_eq!(seen[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn failure_becomes_error_text() {
        let gateway = Recording::new(Err(Error::authentication("invalid key")));
        let reply = get_response(&gateway, vec![ApiMessage::user("Hello")], "gpt-4", "bad").await;
        assert!(reply.is_error());
        assert!(reply.error().unwrap().is_authentication());
        assert_eq!(reply.text(), "Error: Authentication error: invalid key");
    }

    #[tokio::test]
    async fn boxed_gateways_work() {
        let gateway: Box<dyn CompletionGateway> =
            Box::new(Recording::new(Ok("boxed".to_string())));
        let reply = get_response(&gateway, Vec::new(), "gpt-4", "sk").await;
        assert_eq!(reply.text(), "boxed");
    }
}
