//! Agent configuration loading.
//!
//! Reads a YAML agents file (`config.yaml` by convention) and builds an
//! [`AgentRegistry`] from it. Unlike ambient defaults, a broken agents
//! file is fatal: the caller is expected to print the error and exit
//! before any input is read.

use std::path::Path;

use tracing::{debug, info};

use parley_core::agent::engine::AgentEngine;
use parley_core::llm::registry::AgentRegistry;
use parley_types::config::AgentsFile;
use parley_types::error::ConfigError;

use crate::llm::create_provider;

/// Load and validate the agents file at `path`.
///
/// # Errors
///
/// - [`ConfigError::Read`] when the file cannot be read
/// - [`ConfigError::Parse`] when the YAML is malformed
/// - [`ConfigError::NoAgents`] when the file defines no agents
/// - [`ConfigError::AgentNotFound`] when `default_agent` names an agent
///   that does not exist
pub async fn load_agents_file(path: &Path) -> Result<AgentsFile, ConfigError> {
    let content =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;

    let file: AgentsFile =
        serde_yaml_ng::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    if file.agents.is_empty() {
        return Err(ConfigError::NoAgents);
    }

    if let Some(default) = &file.default_agent {
        if !file.agents.contains_key(default) {
            return Err(ConfigError::AgentNotFound(default.clone()));
        }
    }

    debug!(
        path = %path.display(),
        agents = file.agents.len(),
        "loaded agents file"
    );

    Ok(file)
}

/// Build an [`AgentRegistry`] from a validated agents file.
///
/// Constructs one provider per entry, resolving API keys from the
/// environment. Fails on the first entry that cannot be constructed,
/// so a typo in one agent is caught at startup rather than mid-chat.
pub fn build_registry(file: &AgentsFile) -> Result<AgentRegistry, ConfigError> {
    let mut registry = AgentRegistry::new();

    for (name, entry) in &file.agents {
        let provider = create_provider(name, entry)?;
        info!(
            agent = %name,
            provider = provider.name(),
            model = %entry.model,
            "registered agent"
        );
        registry.register(name.clone(), AgentEngine::new(provider, entry.profile()));
    }

    if let Some(default) = &file.default_agent {
        registry.set_default(default.clone());
    }

    Ok(registry)
}
