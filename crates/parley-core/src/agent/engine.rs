//! Agent execution engine for Parley.
//!
//! AgentEngine coordinates one LLM call per user turn: assembles the
//! CompletionRequest from the agent profile plus conversation history,
//! sends it through BoxLlmProvider, and exposes the result either as a
//! full response (`complete`) or as a [`ReplyStream`] of two channels
//! (`stream_reply`). GenAI spans instrument every call.

use tokio::sync::mpsc;
use tracing::{Instrument, debug, info_span, warn};

use futures_util::StreamExt;

use parley_types::config::AgentProfile;
use parley_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, ProviderCapabilities, StopReason,
    StreamEvent,
};

use crate::chat::history::History;
use crate::llm::box_provider::BoxLlmProvider;

/// Buffered display fragments per in-flight reply.
const TEXT_CHANNEL_CAPACITY: usize = 64;

/// A streaming reply in progress.
///
/// Two channels, one producer task: `text` yields incremental display
/// fragments in arrival order; `messages` yields the finalized
/// assistant message (or the stream error) once the provider stream
/// completes. The producer closes `text` before sending on `messages`,
/// so a consumer draining both sees all fragments first.
pub struct ReplyStream {
    pub text: mpsc::Receiver<String>,
    pub messages: mpsc::Receiver<Result<Message, LlmError>>,
}

/// Executes LLM calls on behalf of a configured agent.
pub struct AgentEngine {
    provider: BoxLlmProvider,
    profile: AgentProfile,
}

impl AgentEngine {
    /// Create a new agent engine from a provider and generation profile.
    pub fn new(provider: BoxLlmProvider, profile: AgentProfile) -> Self {
        Self { provider, profile }
    }

    /// Name of the underlying provider backend.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// What the underlying provider supports.
    pub fn capabilities(&self) -> &ProviderCapabilities {
        self.provider.capabilities()
    }

    /// The generation profile this agent was configured with.
    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Build a completion request carrying the full history.
    fn build_request(&self, history: &History, stream: bool) -> CompletionRequest {
        CompletionRequest {
            model: self.profile.model.clone(),
            messages: history.messages().to_vec(),
            system: self.profile.system.clone(),
            max_tokens: self.profile.max_tokens,
            temperature: self.profile.temperature,
            stream,
        }
    }

    /// Start a streaming LLM call for the current history.
    ///
    /// Spawns one task that drains the provider stream: text deltas are
    /// forwarded to the `text` channel as they arrive, and the
    /// accumulated assistant message is sent on `messages` after the
    /// stream ends. On a provider error the task sends `Err` on
    /// `messages` and finalizes no message. The task stops early if the
    /// consumer drops the receivers.
    ///
    /// The caller appends the user message to history before calling
    /// and the finalized assistant message after; the task never
    /// touches history itself.
    pub fn stream_reply(&self, history: &History) -> ReplyStream {
        let request = self.build_request(history, true);

        let span = info_span!(
            "gen_ai.execute",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = true,
        );

        let mut stream = self.provider.stream(request);
        let (text_tx, text_rx) = mpsc::channel(TEXT_CHANNEL_CAPACITY);
        let (message_tx, message_rx) = mpsc::channel(1);

        let drain = async move {
            let mut content = String::new();
            let mut stop_reason = StopReason::EndTurn;

            while let Some(event) = stream.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text, .. }) => {
                        content.push_str(&text);
                        if text_tx.send(text).await.is_err() {
                            debug!("reply consumer dropped, abandoning stream");
                            return;
                        }
                    }
                    Ok(StreamEvent::MessageDelta { stop_reason: sr }) => {
                        stop_reason = sr;
                    }
                    Ok(StreamEvent::Usage(usage)) => {
                        debug!(
                            gen_ai.usage.input_tokens = usage.input_tokens,
                            gen_ai.usage.output_tokens = usage.output_tokens,
                            "token usage"
                        );
                    }
                    Ok(StreamEvent::Done) => break,
                    Ok(_) => {}
                    Err(e) => {
                        // Close the text channel first so the consumer
                        // stops printing before it sees the error.
                        drop(text_tx);
                        let _ = message_tx.send(Err(e)).await;
                        return;
                    }
                }
            }

            if stop_reason == StopReason::MaxTokens {
                warn!("reply truncated at max_tokens");
            }

            drop(text_tx);
            let _ = message_tx.send(Ok(Message::assistant(content))).await;
        };

        tokio::spawn(drain.instrument(span));

        ReplyStream {
            text: text_rx,
            messages: message_rx,
        }
    }

    /// Blocking (non-streaming) generation for the current history.
    pub async fn complete(&self, history: &History) -> Result<CompletionResponse, LlmError> {
        let request = self.build_request(history, false);

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = false,
        );

        self.provider.complete(&request).instrument(span).await
    }
}
