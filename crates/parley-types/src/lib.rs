//! Shared domain types for Parley.
//!
//! This crate contains the core domain types used across the Parley
//! workspace: conversation messages, LLM requests and stream events,
//! the agent configuration schema, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod llm;
