//! Chat engine and provider abstractions for Parley.
//!
//! This crate defines the "ports" the infrastructure layer implements.
//! It depends only on `parley-types` -- never on `parley-infra` or any
//! HTTP/IO crate.

pub mod agent;
pub mod chat;
pub mod llm;

#[cfg(test)]
pub(crate) mod test_support;
