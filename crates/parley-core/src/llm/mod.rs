//! LLM provider abstractions for Parley.
//!
//! This module defines the core traits and utilities for provider
//! integration:
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `AgentRegistry`: name-indexed agents built from configuration

pub mod box_provider;
pub mod provider;
pub mod registry;
