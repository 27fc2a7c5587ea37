//! Agent registry for runtime agent lookup.
//!
//! A name-indexed registry of [`AgentEngine`]s, built once from the
//! configuration file and passed explicitly to whoever needs it. There
//! is deliberately no process-global instance.

use std::collections::BTreeMap;

use parley_types::error::ConfigError;

use crate::agent::engine::AgentEngine;

/// Registry of configured agents, indexed by name.
pub struct AgentRegistry {
    agents: BTreeMap<String, AgentEngine>,
    default_name: Option<String>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
            default_name: None,
        }
    }

    /// Set the agent name used when the caller does not name one.
    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default_name = Some(name.into());
    }

    /// Register an agent under the given name.
    ///
    /// If an agent with this name already exists, it is replaced.
    pub fn register(&mut self, name: impl Into<String>, agent: AgentEngine) {
        self.agents.insert(name.into(), agent);
    }

    /// Look up an agent by name.
    pub fn get(&self, name: &str) -> Option<&AgentEngine> {
        self.agents.get(name)
    }

    /// List all registered agent names in stable order.
    pub fn list_names(&self) -> Vec<&str> {
        self.agents.keys().map(|s| s.as_str()).collect()
    }

    /// Whether any agents are registered.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Resolve the agent for this session.
    ///
    /// Returns the agent's registered name along with the engine.
    /// Precedence: an explicitly requested name, then the configured
    /// default, then the sole registered agent. Fails with
    /// [`ConfigError::AgentNotFound`] for an unknown name and
    /// [`ConfigError::NoDefaultAgent`] when nothing selects an agent
    /// out of several.
    pub fn resolve(&self, requested: Option<&str>) -> Result<(&str, &AgentEngine), ConfigError> {
        if let Some(name) = requested.or(self.default_name.as_deref()) {
            return self
                .agents
                .get_key_value(name)
                .map(|(n, engine)| (n.as_str(), engine))
                .ok_or_else(|| ConfigError::AgentNotFound(name.to_string()));
        }

        let mut entries = self.agents.iter();
        match (entries.next(), entries.next()) {
            (Some((only, engine)), None) => Ok((only.as_str(), engine)),
            (None, _) => Err(ConfigError::NoAgents),
            _ => Err(ConfigError::NoDefaultAgent),
        }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::stub_engine;

    #[test]
    fn test_register_and_get() {
        let mut registry = AgentRegistry::new();
        registry.register("my-agent", stub_engine(&["hi"]));
        assert!(registry.get("my-agent").is_some());
        assert!(registry.get("other").is_none());
    }

    #[test]
    fn test_list_names_stable_order() {
        let mut registry = AgentRegistry::new();
        registry.register("zed", stub_engine(&[]));
        registry.register("alpha", stub_engine(&[]));
        assert_eq!(registry.list_names(), vec!["alpha", "zed"]);
    }

    #[test]
    fn test_resolve_explicit_name() {
        let mut registry = AgentRegistry::new();
        registry.register("a", stub_engine(&[]));
        registry.register("b", stub_engine(&[]));
        let (name, _) = registry.resolve(Some("b")).unwrap();
        assert_eq!(name, "b");
    }

    #[test]
    fn test_resolve_unknown_name_fails() {
        let mut registry = AgentRegistry::new();
        registry.register("a", stub_engine(&[]));
        let err = registry.resolve(Some("missing")).err().unwrap();
        assert!(matches!(err, ConfigError::AgentNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_resolve_uses_default() {
        let mut registry = AgentRegistry::new();
        registry.register("a", stub_engine(&[]));
        registry.register("b", stub_engine(&[]));
        registry.set_default("b");
        let (name, _) = registry.resolve(None).unwrap();
        assert_eq!(name, "b");
    }

    #[test]
    fn test_resolve_sole_agent_without_default() {
        let mut registry = AgentRegistry::new();
        registry.register("only", stub_engine(&[]));
        let (name, _) = registry.resolve(None).unwrap();
        assert_eq!(name, "only");
    }

    #[test]
    fn test_resolve_ambiguous_without_default_fails() {
        let mut registry = AgentRegistry::new();
        registry.register("a", stub_engine(&[]));
        registry.register("b", stub_engine(&[]));
        let err = registry.resolve(None).err().unwrap();
        assert!(matches!(err, ConfigError::NoDefaultAgent));
    }

    #[test]
    fn test_resolve_empty_registry_fails() {
        let registry = AgentRegistry::new();
        let err = registry.resolve(None).err().unwrap();
        assert!(matches!(err, ConfigError::NoAgents));
    }
}
