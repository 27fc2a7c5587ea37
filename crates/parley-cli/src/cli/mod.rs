//! CLI command definitions and dispatch for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. Running `parley` with
//! no subcommand starts the interactive chat loop.

pub mod agents;
pub mod chat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with configured LLM agents from your terminal.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the agents configuration file.
    #[arg(long, short = 'c', global = true, default_value = "config.yaml", env = "PARLEY_CONFIG")]
    pub config: PathBuf,

    /// Agent to chat with (defaults to `default_agent` from the config).
    #[arg(long, short = 'a', global = true)]
    pub agent: Option<String>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session (the default).
    Chat {
        /// Request complete responses instead of streaming tokens.
        #[arg(long)]
        no_stream: bool,
    },

    /// List configured agents.
    #[command(alias = "ls")]
    Agents,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
