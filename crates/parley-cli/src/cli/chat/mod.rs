//! Interactive CLI chat experience for Parley.
//!
//! This module implements the chat loop: async line input, streaming
//! responses with a thinking spinner, and history maintenance. Entry
//! point: `loop_runner::run_chat_loop`.

pub mod input;
pub mod loop_runner;
