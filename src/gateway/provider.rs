//! Provider routing.
//!
//! A model string such as `github/Phi-4`, `claude-3-haiku-20240307`, or
//! `ollama/llama2` names both a provider and a model.  [`ModelRoute::parse`]
//! splits the two and [`Provider`] knows where each vendor lives and which
//! wire dialect it speaks.

use std::fmt;
use std::str::FromStr;

/// Request/response shape spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `POST {base}/chat/completions` with a bearer token.
    OpenAiChat,
    /// `POST {base}/messages` with `x-api-key`.
    AnthropicMessages,
}

/// A completion provider reachable through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// OpenAI.
    OpenAi,
    /// Anthropic.
    Anthropic,
    /// Google Gemini through its OpenAI-compatible endpoint.
    Gemini,
    /// GitHub Models.
    Github,
    /// Groq.
    Groq,
    /// Mistral.
    Mistral,
    /// DeepSeek.
    DeepSeek,
    /// OpenRouter.
    OpenRouter,
    /// Together AI.
    TogetherAi,
    /// A local Ollama server.
    Ollama,
}

impl Provider {
    /// Every provider, in the order they are listed to users.
    pub const ALL: [Provider; 10] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Gemini,
        Provider::Github,
        Provider::Groq,
        Provider::Mistral,
        Provider::DeepSeek,
        Provider::OpenRouter,
        Provider::TogetherAi,
        Provider::Ollama,
    ];

    /// The prefix used in `prefix/model` strings.
    pub fn prefix(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::Github => "github",
            Provider::Groq => "groq",
            Provider::Mistral => "mistral",
            Provider::DeepSeek => "deepseek",
            Provider::OpenRouter => "openrouter",
            Provider::TogetherAi => "together_ai",
            Provider::Ollama => "ollama",
        }
    }

    /// Default API base.  Always ends in `/` so relative joins append.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1/",
            Provider::Anthropic => "https://api.anthropic.com/v1/",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai/",
            Provider::Github => "https://models.inference.ai.azure.com/",
            Provider::Groq => "https://api.groq.com/openai/v1/",
            Provider::Mistral => "https://api.mistral.ai/v1/",
            Provider::DeepSeek => "https://api.deepseek.com/v1/",
            Provider::OpenRouter => "https://openrouter.ai/api/v1/",
            Provider::TogetherAi => "https://api.together.xyz/v1/",
            Provider::Ollama => "http://localhost:11434/v1/",
        }
    }

    /// The wire dialect this provider speaks.
    pub fn dialect(&self) -> Dialect {
        match self {
            Provider::Anthropic => Dialect::AnthropicMessages,
            _ => Dialect::OpenAiChat,
        }
    }

    /// Picks a provider for a model id that carries no prefix.
    pub fn infer(model: &str) -> Provider {
        let lower = model.to_ascii_lowercase();
        if lower.starts_with("claude") {
            Provider::Anthropic
        } else if lower.starts_with("gemini") {
            Provider::Gemini
        } else {
            Provider::OpenAi
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|provider| provider.prefix() == lower)
            .ok_or_else(|| format!("unknown provider: {s}"))
    }
}

/// A model string resolved to a provider and the id that provider expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoute {
    /// Where the request goes.
    pub provider: Provider,
    /// The model id sent on the wire, prefix removed.
    pub model: String,
}

impl ModelRoute {
    /// Resolves a free-form model string.
    ///
    /// A known `provider/` prefix is stripped and selects the provider.  An
    /// unknown prefix is left in place, so `replicate/meta/llama-2-70b-chat`
    /// goes to OpenAI verbatim and the provider's own error comes back.
    pub fn parse(model: &str) -> Self {
        if let Some((prefix, rest)) = model.split_once('/')
            && let Ok(provider) = prefix.parse::<Provider>()
        {
            return Self {
                provider,
                model: rest.to_string(),
            };
        }
        Self {
            provider: Provider::infer(model),
            model: model.to_string(),
        }
    }
}

impl fmt::Display for ModelRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Example model strings, grouped by provider, for the `/models` listing.
pub const POPULAR_MODELS: &[(&str, &[&str])] = &[
    ("OpenAI", &["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo", "gpt-4o-mini"]),
    (
        "Anthropic",
        &[
            "claude-3-sonnet-20240229",
            "claude-3-haiku-20240307",
            "claude-3-opus-20240229",
        ],
    ),
    ("Google", &["gemini-pro", "gemini-1.5-pro"]),
    (
        "Others",
        &[
            "github/Phi-4",
            "ollama/llama2",
            "groq/llama3-8b-8192",
            "together_ai/togethercomputer/llama-2-70b-chat",
        ],
    ),
];
