//! Configuration for a chat session.
//!
//! [`ChatArgs`] is parsed from the command line via `arrrg`.  [`SessionConfig`]
//! holds the two values a session can change while running, and
//! [`ConfigGate`] decides whether those values are enough to chat.

use std::fmt;
use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::secrets::SecretStore;

/// Model used when none is given.
pub const DEFAULT_MODEL: &str = "github/Phi-4";

/// Command-line arguments for the llmchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use, e.g. gpt-4 or ollama/llama2 (default: github/Phi-4)", "MODEL")]
    pub model: Option<String>,

    /// Base URL that replaces the provider's.
    #[arrrg(optional, "Send requests to this base URL instead of the provider's", "URL")]
    pub api_base: Option<String>,

    /// Path to the YAML secrets file.
    #[arrrg(optional, "Secrets file holding api_key (default: ~/.llmchat/secrets.yaml)", "PATH")]
    pub secrets: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Log gateway traffic to stderr.
    #[arrrg(flag, "Log requests and errors to stderr")]
    pub verbose: bool,
}

impl ChatArgs {
    /// The secrets file to read, explicit or default.
    pub fn secrets_path(&self) -> Option<PathBuf> {
        self.secrets
            .as_ref()
            .map(PathBuf::from)
            .or_else(SecretStore::default_path)
    }
}

/// The model and credential a session chats with.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Free-form model string.
    pub model: String,

    /// Provider credential.
    pub api_key: String,
}

impl SessionConfig {
    /// Creates a config from explicit values.
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Resolves the startup config: model from the arguments (or the
    /// default), key from the secret store.
    pub fn from_args(args: &ChatArgs, secrets: &SecretStore) -> Self {
        Self {
            model: args
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: secrets.api_key(),
        }
    }

    /// Stores `model` if it differs from the current value.  Returns whether
    /// anything changed.
    pub fn update_model(&mut self, model: &str) -> bool {
        if self.model == model {
            return false;
        }
        self.model = model.to_string();
        true
    }

    /// Stores `api_key` if it differs from the current value.  Returns
    /// whether anything changed.
    pub fn update_api_key(&mut self, api_key: &str) -> bool {
        if self.api_key == api_key {
            return false;
        }
        self.api_key = api_key.to_string();
        true
    }

    /// Returns true if an API key is set.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Evaluates the config gate.
    pub fn gate(&self) -> ConfigGate {
        ConfigGate::evaluate(self)
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("model", &self.model)
            .field("api_key", &mask_api_key(&self.api_key))
            .finish()
    }
}

/// Whether a session may chat.
///
/// Both the model and the key must be non-empty.  Values are not trimmed, so
/// a key of `"   "` passes and fails later at the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigGate {
    /// Model and key are both set.
    Configured,
    /// At least one of them is empty.
    Unconfigured {
        /// The model string is empty.
        missing_model: bool,
        /// The API key is empty.
        missing_api_key: bool,
    },
}

impl ConfigGate {
    /// Computes the gate for `config`.
    pub fn evaluate(config: &SessionConfig) -> Self {
        let missing_model = config.model.is_empty();
        let missing_api_key = config.api_key.is_empty();
        if missing_model || missing_api_key {
            ConfigGate::Unconfigured {
                missing_model,
                missing_api_key,
            }
        } else {
            ConfigGate::Configured
        }
    }

    /// Returns true if chatting is allowed.
    pub fn is_open(&self) -> bool {
        matches!(self, ConfigGate::Configured)
    }
}

/// Masks all but the last four characters of a key.
pub fn mask_api_key(api_key: &str) -> String {
    let count = api_key.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 8 {
        return "*".repeat(count);
    }
    let tail: String = api_key.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

/// How to get going when the gate is closed.
pub fn setup_instructions() -> &'static str {
    r#"Please set your API key and model name to start chatting.

How to use:
  1. Pick any model the gateway can route (see /models for examples):
       /model gpt-4
  2. Enter your API key for the corresponding provider:
       /key sk-...
     or put `api_key: ...` in ~/.llmchat/secrets.yaml, or export LLMCHAT_API_KEY.
  3. Start chatting!

Supported providers: OpenAI, Anthropic, Google Gemini, GitHub Models, Groq,
Mistral, DeepSeek, OpenRouter, Together AI, and Ollama."#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_args_defaults() {
        let secrets = SecretStore::new().with_override("api_key", Some("sk-file".to_string()));
        let config = SessionConfig::from_args(&ChatArgs::default(), &secrets);
        assert_eq!(config.model, "github/Phi-4");
        assert_eq!(config.api_key, "sk-file");
    }

    #[test]
    fn from_args_custom_model_without_secret() {
        let args = ChatArgs {
            model: Some("gpt-4".to_string()),
            ..ChatArgs::default()
        };
        let config = SessionConfig::from_args(&args, &SecretStore::new());
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.api_key, "");
        assert!(!config.has_api_key());
    }

    #[test]
    fn secrets_path_prefers_explicit() {
        let args = ChatArgs {
            secrets: Some("/tmp/s.yaml".to_string()),
            ..ChatArgs::default()
        };
        assert_eq!(args.secrets_path(), Some(PathBuf::from("/tmp/s.yaml")));
    }

    #[test]
    fn updates_report_changes() {
        let mut config = SessionConfig::new("gpt-4", "sk");
        assert!(!config.update_model("gpt-4"));
        assert!(config.update_model("claude-3-haiku-20240307"));
        assert_eq!(config.model, "claude-3-haiku-20240307");
        assert!(!config.update_api_key("sk"));
        assert!(config.update_api_key(""));
        assert_eq!(config.api_key, "");
    }

    #[test]
    fn gate_requires_both_values() {
        assert_eq!(
            SessionConfig::new("", "nonempty").gate(),
            ConfigGate::Unconfigured {
                missing_model: true,
                missing_api_key: false,
            }
        );
        assert_eq!(
            SessionConfig::new("gpt-4", "").gate(),
            ConfigGate::Unconfigured {
                missing_model: false,
                missing_api_key: true,
            }
        );
        assert!(!SessionConfig::new("", "").gate().is_open());
        assert_eq!(
            SessionConfig::new("gpt-4", "nonempty").gate(),
            ConfigGate::Configured
        );
    }

    #[test]
    fn gate_does_not_trim() {
        assert!(SessionConfig::new(" ", "\t").gate().is_open());
    }

    #[test]
    fn gate_follows_updates() {
        let mut config = SessionConfig::new("gpt-4", "");
        assert!(!config.gate().is_open());
        config.update_api_key("sk");
        assert!(config.gate().is_open());
        config.update_model("");
        assert!(!config.gate().is_open());
    }

    #[test]
    fn masking() {
        assert_eq!(mask_api_key(""), "");
        assert_eq!(mask_api_key("short"), "*****");
        assert_eq!(mask_api_key("sk-abcdefgh1234"), "***********1234");
    }

    #[test]
    fn debug_masks_key() {
        let config = SessionConfig::new("gpt-4", "sk-abcdefgh1234");
        let debug = format!("{config:?}");
        assert!(debug.contains("gpt-4"));
        assert!(!debug.contains("abcdefgh"));
    }

    #[test]
    fn instructions_mention_commands() {
        let text = setup_instructions();
        assert!(text.contains("/model"));
        assert!(text.contains("/key"));
    }
}
