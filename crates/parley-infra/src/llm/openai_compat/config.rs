//! Configuration types and per-provider defaults for OpenAI-compatible providers.
//!
//! Each provider that speaks the OpenAI chat completions protocol gets a factory
//! function returning an [`OpenAiCompatConfig`] with the correct base URL,
//! capabilities, and defaults.

use parley_types::llm::ProviderCapabilities;

/// Default base URL for a local Ollama server.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "ollama").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier (e.g., "gpt-4o", "llama3.2").
    pub model: String,
    /// What this provider supports.
    pub capabilities: ProviderCapabilities,
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`
/// Capabilities: streaming; 128K context, 16K output.
pub fn openai_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: "https://api.openai.com/v1".into(),
        api_key: api_key.into(),
        model: model.into(),
        capabilities: ProviderCapabilities {
            streaming: true,
            max_context_tokens: 128_000,
            max_output_tokens: 16_384,
        },
    }
}

/// Ollama default configuration (local inference server).
///
/// Base URL defaults to [`OLLAMA_DEFAULT_BASE_URL`]; Ollama ignores the
/// bearer token, so a placeholder key is used. Context limits depend on
/// the loaded model, so conservative defaults apply.
pub fn ollama_defaults(base_url: Option<&str>, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "ollama".into(),
        base_url: base_url.unwrap_or(OLLAMA_DEFAULT_BASE_URL).into(),
        api_key: "ollama".into(),
        model: model.into(),
        capabilities: ProviderCapabilities {
            streaming: true,
            max_context_tokens: 32_768,
            max_output_tokens: 8_192,
        },
    }
}

/// Configuration for an arbitrary OpenAI-compatible endpoint.
///
/// `name` is the agent's configured name, so log lines and listings
/// identify which endpoint answered. Capabilities use the same
/// conservative defaults as Ollama since the server is unknown.
pub fn custom(name: &str, base_url: &str, api_key: &str, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: name.into(),
        base_url: base_url.into(),
        api_key: api_key.into(),
        model: model.into(),
        capabilities: ProviderCapabilities {
            streaming: true,
            max_context_tokens: 32_768,
            max_output_tokens: 8_192,
        },
    }
}
