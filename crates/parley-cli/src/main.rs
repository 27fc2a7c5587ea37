//! Parley CLI entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads the agents configuration, and dispatches
//! to the chat loop or an auxiliary command. Configuration and agent
//! resolution failures are fatal: the process exits non-zero before any
//! input is read.

mod cli;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,parley=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Shell completions don't need a config file
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    let file = parley_infra::config::load_agents_file(&cli.config).await?;
    let registry = parley_infra::config::build_registry(&file)?;

    match cli.command {
        Some(Commands::Agents) => {
            cli::agents::list_agents(&file, &registry, cli.json)?;
        }

        Some(Commands::Chat { no_stream }) => {
            run_chat(&registry, cli.agent.as_deref(), no_stream).await?;
        }

        // Bare `parley` starts a chat
        None => {
            run_chat(&registry, cli.agent.as_deref(), false).await?;
        }

        Some(Commands::Completions { .. }) => unreachable!("handled above"),
    }

    Ok(())
}

/// Resolve the agent and run the interactive loop.
///
/// Resolution happens before the first prompt so a missing agent fails
/// fast instead of swallowing a typed question.
async fn run_chat(
    registry: &parley_core::llm::registry::AgentRegistry,
    requested: Option<&str>,
    no_stream: bool,
) -> anyhow::Result<()> {
    let (name, engine) = registry.resolve(requested)?;
    cli::chat::loop_runner::run_chat_loop(engine, name, no_stream).await
}
