//! Configuration file schema for Parley.
//!
//! `AgentsFile` represents the top-level `config.yaml` that declares
//! the named agents available to the chat loop. Parsing happens in
//! parley-infra; this crate only defines the shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::llm::ProviderType;

/// Top-level configuration file: a registry of named agent entries.
///
/// ```yaml
/// default_agent: my-agent
/// agents:
///   my-agent:
///     provider: anthropic
///     model: claude-sonnet-4-20250514
///     system: "Answer concisely."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsFile {
    /// Agent to use when `--agent` is not given. Optional when exactly
    /// one agent is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_agent: Option<String>,

    /// Named agent entries. BTreeMap keeps listing order stable.
    pub agents: BTreeMap<String, AgentEntry>,
}

/// A single named agent in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    /// Which provider backend serves this agent.
    pub provider: ProviderType,

    /// Model identifier (e.g., "claude-sonnet-4-20250514", "gpt-4o").
    pub model: String,

    /// Environment variable holding the API key. Defaults per provider
    /// (ANTHROPIC_API_KEY, OPENAI_API_KEY); Ollama needs none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Base URL override, required for `openai_compatible`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Optional system prompt sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    4096
}

/// Generation settings an [`AgentEntry`] resolves to at runtime.
///
/// What the engine needs to build a `CompletionRequest`; the provider
/// choice and credentials have already been consumed by then.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub model: String,
    pub system: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: u32,
}

impl AgentEntry {
    /// Extract the runtime generation profile from this entry.
    pub fn profile(&self) -> AgentProfile {
        AgentProfile {
            model: self.model.clone(),
            system: self.system.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
