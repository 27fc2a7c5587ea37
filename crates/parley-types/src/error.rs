use thiserror::Error;

/// Errors related to loading configuration and resolving agents.
///
/// All of these are fatal at startup: the process prints the
/// diagnostic and exits non-zero before reading any input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("no agents defined in config file")]
    NoAgents,

    #[error("agent '{0}' not found in config")]
    AgentNotFound(String),

    #[error("no agent selected: pass --agent or set default_agent in config")]
    NoDefaultAgent,

    #[error("agent '{agent}': provider '{provider}' requires base_url")]
    MissingBaseUrl { agent: String, provider: String },

    #[error("agent '{agent}': API key not found in environment variable '{env_var}'")]
    MissingApiKey { agent: String, env_var: String },
}
