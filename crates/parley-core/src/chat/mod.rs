//! Conversation state for the chat loop.

pub mod history;
