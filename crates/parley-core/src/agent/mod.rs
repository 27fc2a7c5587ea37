//! Agent execution engine for Parley.
//!
//! `AgentEngine` binds an LLM provider to a configured generation
//! profile and turns provider stream events into the pair of reply
//! channels the chat loop consumes.

pub mod engine;
