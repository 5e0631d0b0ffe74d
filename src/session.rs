//! Core chat session management.
//!
//! A [`ChatSession`] owns everything one conversation needs: the transcript,
//! the model/key config, and the gateway that produces replies.  The shell
//! drives it one line at a time.

use crate::config::{ConfigGate, SessionConfig};
use crate::error::{Error, Result};
use crate::gateway::{CompletionGateway, Reply, get_response};
use crate::observability::{SESSION_CLEARS, SESSION_EXCHANGES, SESSION_GATE_BLOCKED};
use crate::transcript::Transcript;
use crate::types::ChatMessage;
use crate::utils::Clock;

/// The two messages one submission adds to the transcript.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// The user's message as stored.
    pub user: ChatMessage,
    /// The assistant's message as stored; error text on failure.
    pub assistant: ChatMessage,
    /// What the gateway returned.
    pub reply: Reply,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The model string in use.
    pub model: String,
    /// Whether an API key is set.
    pub api_key_set: bool,
    /// The number of messages in the transcript.
    pub message_count: usize,
    /// Submissions sent to the gateway.
    pub exchanges: u64,
    /// Submissions whose reply was an error.
    pub failed_exchanges: u64,
}

/// A chat session that manages conversation state and gateway calls.
pub struct ChatSession<G: CompletionGateway> {
    gateway: G,
    config: SessionConfig,
    transcript: Transcript,
    clock: Clock,
    exchanges: u64,
    failed_exchanges: u64,
}

impl<G: CompletionGateway> ChatSession<G> {
    /// Creates a new chat session stamping messages in local time.
    pub fn new(gateway: G, config: SessionConfig) -> Self {
        Self::with_clock(gateway, config, Clock::local())
    }

    /// Creates a new chat session with a specific clock.
    pub fn with_clock(gateway: G, config: SessionConfig, clock: Clock) -> Self {
        Self {
            gateway,
            config,
            transcript: Transcript::new(),
            clock,
            exchanges: 0,
            failed_exchanges: 0,
        }
    }

    /// Sends a user message and records the reply.
    ///
    /// On success the transcript has grown by exactly two messages: the
    /// prompt, then the reply.  A gateway failure still adds both, with the
    /// reply reading `Error: ...`.
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving the transcript untouched, if the
    /// model or API key is empty.
    pub async fn send(&mut self, prompt: &str) -> Result<Exchange> {
        if let ConfigGate::Unconfigured {
            missing_model,
            missing_api_key,
        } = self.gate()
        {
            SESSION_GATE_BLOCKED.click();
            let param = match (missing_model, missing_api_key) {
                (true, true) => "model, api_key",
                (true, false) => "model",
                _ => "api_key",
            };
            return Err(Error::validation(
                "model and API key must both be set before chatting",
                Some(param.to_string()),
            ));
        }

        let user = ChatMessage::user(prompt, self.clock.now());
        self.transcript.append(user.clone());

        let reply = get_response(
            &self.gateway,
            self.transcript.to_api_form(),
            &self.config.model,
            &self.config.api_key,
        )
        .await;

        let assistant = ChatMessage::assistant(reply.text(), self.clock.now());
        self.transcript.append(assistant.clone());

        SESSION_EXCHANGES.click();
        self.exchanges += 1;
        if reply.is_error() {
            self.failed_exchanges += 1;
        }
        tracing::debug!(
            messages = self.transcript.len(),
            failed = reply.is_error(),
            "exchange recorded"
        );

        Ok(Exchange {
            user,
            assistant,
            reply,
        })
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        SESSION_CLEARS.click();
        self.transcript.clear();
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    /// Returns the transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the current config.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Evaluates the config gate against the current values.
    pub fn gate(&self) -> ConfigGate {
        self.config.gate()
    }

    /// Changes the model.  Returns whether it differed.
    pub fn set_model(&mut self, model: &str) -> bool {
        self.config.update_model(model)
    }

    /// Returns the current model.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Changes the API key.  Returns whether it differed.
    pub fn set_api_key(&mut self, api_key: &str) -> bool {
        self.config.update_api_key(api_key)
    }

    /// Returns the gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            api_key_set: self.config.has_api_key(),
            message_count: self.message_count(),
            exchanges: self.exchanges,
            failed_exchanges: self.failed_exchanges,
        }
    }
}
