//! Infrastructure layer for Parley.
//!
//! Contains the configuration loader and the concrete implementations
//! of the [`LlmProvider`](parley_core::llm::provider::LlmProvider)
//! trait: the Anthropic Messages API and OpenAI-compatible endpoints
//! (OpenAI, local Ollama, custom base URLs).

pub mod config;
pub mod llm;
