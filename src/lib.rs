//! llmchat: chat with many LLM providers through one completion API.
//!
//! The library holds the session state and the gateway; `src/bin/llmchat.rs`
//! wraps them in an interactive shell.
//!
//! ```no_run
//! use llmchat::{ChatSession, HttpGateway, SessionConfig};
//!
//! # async fn demo() -> llmchat::Result<()> {
//! let gateway = HttpGateway::new()?;
//! let mut session = ChatSession::new(gateway, SessionConfig::new("gpt-4", "sk-..."));
//! let exchange = session.send("Hello").await?;
//! println!("{}", exchange.assistant.content);
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod render;
pub mod secrets;
pub mod session;
pub mod transcript;
pub mod types;
pub mod utils;

mod observability;

// Re-exports
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ConfigGate, DEFAULT_MODEL, SessionConfig, mask_api_key};
pub use error::{Error, Result};
pub use gateway::{
    CompletionGateway, CompletionRequest, HttpGateway, MAX_TOKENS, ModelRoute, Provider, Reply,
    TEMPERATURE, get_response,
};
pub use observability::{MetricsSnapshot, register_biometrics};
pub use render::{PlainTextRenderer, Renderer};
pub use secrets::SecretStore;
pub use session::{ChatSession, Exchange, SessionStats};
pub use transcript::Transcript;
pub use types::*;
pub use utils::Clock;
