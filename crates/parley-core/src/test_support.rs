//! Deterministic stub provider shared across this crate's tests.

use std::pin::Pin;
use std::sync::{Arc, Mutex};

use futures_util::{Stream, stream};

use parley_types::config::AgentProfile;
use parley_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, StreamEvent,
    Usage,
};

use crate::agent::engine::AgentEngine;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::provider::LlmProvider;

/// Scripted provider: emits a fixed fragment sequence, or fails.
///
/// Records every request it receives so tests can assert on the
/// history and profile the engine sent.
pub struct StubProvider {
    fragments: Vec<String>,
    fail: Option<String>,
    capabilities: ProviderCapabilities,
    pub seen: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl StubProvider {
    pub fn text(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            fail: None,
            capabilities: ProviderCapabilities {
                streaming: true,
                max_context_tokens: 8_192,
                max_output_tokens: 1_024,
            },
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        let mut stub = Self::text(&[]);
        stub.fail = Some(message.to_string());
        stub
    }
}

impl LlmProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.seen.lock().unwrap().push(request.clone());
        if let Some(message) = &self.fail {
            return Err(LlmError::Stream(message.clone()));
        }
        Ok(CompletionResponse {
            id: "stub-reply".to_string(),
            content: self.fragments.concat(),
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        self.seen.lock().unwrap().push(request);

        if let Some(message) = &self.fail {
            let err = LlmError::Stream(message.clone());
            return Box::pin(stream::iter(vec![Err(err)]));
        }

        let mut events: Vec<Result<StreamEvent, LlmError>> = vec![Ok(StreamEvent::Connected)];
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
        Box::pin(stream::iter(events))
    }
}

/// A profile with fixed test values.
pub fn profile() -> AgentProfile {
    AgentProfile {
        model: "stub-model".to_string(),
        system: None,
        temperature: None,
        max_tokens: 256,
    }
}

/// An engine over a scripted text stub.
pub fn stub_engine(fragments: &[&str]) -> AgentEngine {
    AgentEngine::new(BoxLlmProvider::new(StubProvider::text(fragments)), profile())
}
