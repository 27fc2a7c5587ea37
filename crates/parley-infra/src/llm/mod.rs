//! LLM provider implementations.
//!
//! Contains concrete implementations of the [`LlmProvider`] trait
//! defined in `parley-core`, plus the provider factory
//! ([`create_provider`]) that constructs the right provider from a
//! configuration entry, resolving API keys from the environment.
//!
//! [`LlmProvider`]: parley_core::llm::provider::LlmProvider

pub mod anthropic;
pub mod openai_compat;

use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_types::config::AgentEntry;
use parley_types::error::ConfigError;
use parley_types::llm::ProviderType;

use self::anthropic::AnthropicProvider;
use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] for one named agent entry.
///
/// The API key is read from the environment variable named by
/// `api_key_env` (falling back to the provider's conventional variable).
/// Ollama and custom OpenAI-compatible endpoints without `api_key_env`
/// run keyless, which is what local inference servers expect.
///
/// # Errors
///
/// [`ConfigError::MissingApiKey`] when a required key is absent from
/// the environment; [`ConfigError::MissingBaseUrl`] for an
/// `openai_compatible` entry without a `base_url`.
pub fn create_provider(agent: &str, entry: &AgentEntry) -> Result<BoxLlmProvider, ConfigError> {
    match entry.provider {
        ProviderType::Anthropic => {
            let key = resolve_api_key(agent, entry, "ANTHROPIC_API_KEY")?;
            let mut provider = AnthropicProvider::new(key, entry.model.clone());
            if let Some(base_url) = &entry.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(BoxLlmProvider::new(provider))
        }
        ProviderType::OpenAi => {
            let key = resolve_api_key(agent, entry, "OPENAI_API_KEY")?;
            let provider =
                OpenAiCompatibleProvider::openai(key.expose_secret(), &entry.model);
            Ok(BoxLlmProvider::new(provider))
        }
        ProviderType::Ollama => {
            let provider =
                OpenAiCompatibleProvider::ollama(entry.base_url.as_deref(), &entry.model);
            Ok(BoxLlmProvider::new(provider))
        }
        ProviderType::OpenAiCompatible => {
            let base_url = entry.base_url.clone().ok_or_else(|| {
                ConfigError::MissingBaseUrl {
                    agent: agent.to_string(),
                    provider: entry.provider.to_string(),
                }
            })?;
            // Key is optional here: local OpenAI-compatible servers
            // accept any bearer token.
            let key = match entry.api_key_env.as_deref() {
                Some(env_var) => resolve_named_key(agent, env_var)?,
                None => SecretString::from("unused"),
            };
            let provider = OpenAiCompatibleProvider::new(openai_compat::config::custom(
                agent,
                &base_url,
                key.expose_secret(),
                &entry.model,
            ));
            Ok(BoxLlmProvider::new(provider))
        }
    }
}

/// Resolve the API key for an entry, falling back to the provider's
/// conventional environment variable name.
fn resolve_api_key(
    agent: &str,
    entry: &AgentEntry,
    default_env: &str,
) -> Result<SecretString, ConfigError> {
    let env_var = entry.api_key_env.as_deref().unwrap_or(default_env);
    resolve_named_key(agent, env_var)
}

/// Read one environment variable as a secret.
///
/// Empty and non-Unicode values are treated as absent: a key must be a
/// usable string.
fn resolve_named_key(agent: &str, env_var: &str) -> Result<SecretString, ConfigError> {
    match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConfigError::MissingApiKey {
            agent: agent.to_string(),
            env_var: env_var.to_string(),
        }),
    }
}
