//! Main chat loop orchestration.
//!
//! Coordinates the conversation lifecycle: prompt, user input, history
//! append, streaming LLM call, fragment display, and finalized message
//! append. The loop is the only writer to the conversation history; the
//! engine's producer task only communicates through channels.

use std::io::Write;
use std::time::{Duration, Instant};

use console::style;
use tracing::{debug, info};

use parley_core::agent::engine::{AgentEngine, ReplyStream};
use parley_core::chat::history::History;
use parley_types::llm::{LlmError, Message};

use super::input::{ChatInput, InputEvent};

/// True for the keywords that end the session.
fn is_exit_keyword(input: &str) -> bool {
    matches!(input, "quit" | "exit")
}

/// Drain a [`ReplyStream`] to completion.
///
/// Calls `on_fragment` for each display fragment as it arrives and
/// returns the finalized assistant message once both channels close.
/// Waiting for the `messages` channel before returning means the caller
/// never prompts for the next turn with a reply still in flight.
pub(crate) async fn drain_reply(
    mut reply: ReplyStream,
    mut on_fragment: impl FnMut(&str),
) -> Result<Message, LlmError> {
    let mut finalized: Option<Result<Message, LlmError>> = None;
    let mut text_open = true;
    let mut messages_open = true;

    while text_open || messages_open {
        tokio::select! {
            fragment = reply.text.recv(), if text_open => match fragment {
                Some(f) => on_fragment(&f),
                None => text_open = false,
            },
            message = reply.messages.recv(), if messages_open => match message {
                Some(m) => finalized = Some(m),
                None => messages_open = false,
            },
        }
    }

    finalized
        .unwrap_or_else(|| Err(LlmError::Stream("reply ended without a message".to_string())))
}

/// Make a "Generating content..." spinner.
fn generation_spinner() -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_style(
        indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("static spinner template"),
    );
    spinner.set_message("Generating content...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Run the interactive chat loop against a resolved agent.
///
/// Reads lines until `quit`, `exit`, or EOF. Each turn appends the user
/// message to history, streams the reply (printing fragments as they
/// arrive), and appends the finalized assistant message. On an LLM
/// error the dangling user message is rolled back so a retry does not
/// duplicate it.
pub async fn run_chat_loop(
    engine: &AgentEngine,
    agent_name: &str,
    no_stream: bool,
) -> anyhow::Result<()> {
    println!();
    println!(
        "  {} Chatting with {} ({} / {})",
        style("›").cyan().bold(),
        style(agent_name).cyan().bold(),
        engine.provider_name(),
        style(&engine.profile().model).dim(),
    );
    println!(
        "  {}",
        style("Type 'quit' or 'exit' (or Ctrl+D) to leave.").dim()
    );
    println!();

    let mut history = History::new();

    let prompt = format!("{}", style("Enter your question: ").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }
                if is_exit_keyword(&text) {
                    println!("\n  {}", style("Session ended.").dim());
                    break;
                }

                history.add_user_message(text);

                let outcome = if no_stream {
                    run_complete_turn(engine, &history).await
                } else {
                    run_streaming_turn(engine, &history).await
                };

                match outcome {
                    Ok(message) => {
                        debug!(turns = history.len() + 1, "assistant reply finalized");
                        history.push(message);
                    }
                    Err(e) => {
                        eprintln!("\n  {} LLM error: {e}", style("!").red().bold());
                        eprintln!(
                            "  {}",
                            style("Type a message to retry, or 'exit' to quit.").dim()
                        );
                        // Roll back so a retry does not send the
                        // question twice.
                        history.pop_user_message();
                    }
                }
            }
        }
    }

    info!(turns = history.len(), "chat session ended");
    Ok(())
}

/// One streaming turn: spinner until the first fragment, then print
/// fragments as they arrive.
async fn run_streaming_turn(
    engine: &AgentEngine,
    history: &History,
) -> Result<Message, LlmError> {
    let spinner = generation_spinner();
    let start = Instant::now();

    let reply = engine.stream_reply(history);

    let mut first_fragment = true;
    let result = drain_reply(reply, |fragment| {
        if first_fragment {
            spinner.finish_and_clear();
            first_fragment = false;
            println!();
        }
        print!("{fragment}");
        let _ = std::io::stdout().flush();
    })
    .await;

    if first_fragment {
        spinner.finish_and_clear();
    }
    if result.is_ok() {
        println!();
        println!();
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "reply complete");
    }

    result
}

/// One non-streaming turn: spinner until the full response arrives.
async fn run_complete_turn(engine: &AgentEngine, history: &History) -> Result<Message, LlmError> {
    let spinner = generation_spinner();
    let response = engine.complete(history).await;
    spinner.finish_and_clear();

    let response = response?;
    println!("\n{}\n", response.content);
    Ok(Message::assistant(response.content))
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;

    use futures_util::{Stream, StreamExt, stream};

    use parley_core::llm::box_provider::BoxLlmProvider;
    use parley_core::llm::provider::LlmProvider;
    use parley_types::config::AgentProfile;
    use parley_types::llm::{
        CompletionRequest, CompletionResponse, ProviderCapabilities, StopReason, StreamEvent,
        Usage,
    };

    use super::*;

    struct ScriptedProvider {
        fragments: Vec<String>,
        fail: bool,
        capabilities: ProviderCapabilities,
    }

    impl ScriptedProvider {
        fn speaking(fragments: &[&str]) -> Self {
            Self {
                fragments: fragments.iter().map(|s| s.to_string()).collect(),
                fail: false,
                capabilities: ProviderCapabilities {
                    streaming: true,
                    max_context_tokens: 8_192,
                    max_output_tokens: 1_024,
                },
            }
        }

        fn failing() -> Self {
            let mut p = Self::speaking(&[]);
            p.fail = true;
            p
        }

        fn engine(self) -> AgentEngine {
            AgentEngine::new(
                BoxLlmProvider::new(self),
                AgentProfile {
                    model: "scripted-model".to_string(),
                    system: None,
                    temperature: None,
                    max_tokens: 1_024,
                },
            )
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            if self.fail {
                return Err(LlmError::Stream("scripted failure".to_string()));
            }
            Ok(CompletionResponse {
                id: "resp_1".to_string(),
                content: self.fragments.concat(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }

        fn stream(
            &self,
            _request: CompletionRequest,
        ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
            if self.fail {
                return stream::once(async {
                    Err(LlmError::Stream("scripted failure".to_string()))
                })
                .boxed();
            }
            let mut events = vec![Ok(StreamEvent::Connected)];
            for fragment in &self.fragments {
                events.push(Ok(StreamEvent::TextDelta {
                    index: 0,
                    text: fragment.clone(),
                }));
            }
            events.push(Ok(StreamEvent::MessageDelta {
                stop_reason: StopReason::EndTurn,
            }));
            events.push(Ok(StreamEvent::Done));
            stream::iter(events).boxed()
        }
    }

    #[test]
    fn test_exit_keywords() {
        assert!(is_exit_keyword("quit"));
        assert!(is_exit_keyword("exit"));
        assert!(!is_exit_keyword("quit please"));
        assert!(!is_exit_keyword("Quit"));
        assert!(!is_exit_keyword(""));
    }

    #[tokio::test]
    async fn test_drain_reply_collects_fragments_then_message() {
        let engine = ScriptedProvider::speaking(&["Hel", "lo"]).engine();
        let mut history = History::new();
        history.add_user_message("Say hello");

        let mut printed = String::new();
        let message = drain_reply(engine.stream_reply(&history), |fragment| {
            printed.push_str(fragment);
        })
        .await
        .unwrap();

        assert_eq!(printed, "Hello");
        assert_eq!(message.content, "Hello");
    }

    #[tokio::test]
    async fn test_drain_reply_surfaces_stream_error() {
        let engine = ScriptedProvider::failing().engine();
        let mut history = History::new();
        history.add_user_message("hi");

        let mut fragments = 0usize;
        let err = drain_reply(engine.stream_reply(&history), |_| fragments += 1)
            .await
            .unwrap_err();

        assert_eq!(fragments, 0);
        assert!(matches!(err, LlmError::Stream(_)));
    }

    #[tokio::test]
    async fn test_failed_turn_rolls_back_user_message() {
        let engine = ScriptedProvider::failing().engine();
        let mut history = History::new();
        history.add_user_message("hi");

        let err = drain_reply(engine.stream_reply(&history), |_| {}).await;
        assert!(err.is_err());

        // What run_chat_loop does on error: drop the dangling user turn.
        history.pop_user_message();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_complete_turn_returns_assistant_message() {
        let engine = ScriptedProvider::speaking(&["Hel", "lo"]).engine();
        let mut history = History::new();
        history.add_user_message("Say hello");

        let message = run_complete_turn(&engine, &history).await.unwrap();
        assert_eq!(message.content, "Hello");
    }
}
