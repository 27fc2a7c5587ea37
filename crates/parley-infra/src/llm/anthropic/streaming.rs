//! SSE stream creation and state machine for Anthropic Messages API.
//!
//! Implements the streaming protocol described in the Anthropic docs:
//! 1. `message_start` -- Message object with initial usage
//! 2. Per block: `content_block_start` -> N x `content_block_delta` -> `content_block_stop`
//! 3. `message_delta` -- stop_reason and cumulative usage
//! 4. `message_stop` -- final event
//! 5. `ping` events may appear anywhere (keepalive)
//! 6. `error` events may appear mid-stream

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use tracing::trace;

use parley_types::llm::{LlmError, StopReason, StreamEvent, Usage};

use super::types::{
    AnthropicDelta, AnthropicError, AnthropicRequest, ContentBlockDeltaPayload,
    ContentBlockStartPayload, ContentBlockStopPayload, ErrorPayload, MessageDeltaPayload,
    MessageStartPayload,
};

/// Create a streaming SSE connection to the Anthropic Messages API.
///
/// Returns a `Stream` of [`StreamEvent`]s that maps Anthropic-specific
/// SSE events to the provider-agnostic stream event enum.
///
/// # Arguments
///
/// * `client` - Shared reqwest HTTP client
/// * `url` - Full API URL (e.g., "https://api.anthropic.com/v1/messages")
/// * `body` - Serialized Anthropic request with `stream: true`
/// * `api_key` - API key wrapped in SecretString
pub fn create_anthropic_stream(
    client: &reqwest::Client,
    url: &str,
    body: AnthropicRequest,
    api_key: &SecretString,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    // The request is fully built here so the stream owns no borrows.
    let request = client
        .post(url)
        .header("x-api-key", api_key.expose_secret())
        .header("anthropic-version", super::client::AnthropicProvider::API_VERSION)
        .header("content-type", "application/json")
        .json(&body);

    Box::pin(async_stream::try_stream! {
        let response = request.send().await.map_err(|e| LlmError::Provider {
            message: format!("HTTP request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            // text() consumes the response, so this branch must not
            // fall through to bytes_stream() below.
            let error_body = response.text().await.unwrap_or_default();
            Err(match status.as_u16() {
                401 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited { retry_after_ms: None },
                529 => LlmError::Overloaded(error_body),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            })?;
            return;
        }

        yield StreamEvent::Connected;

        let mut events = response.bytes_stream().eventsource();

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            trace!(event = %event.event, "sse event");

            match event.event.as_str() {
                "message_start" => {
                    let payload: MessageStartPayload = parse(&event.data)?;
                    if let Some(usage) = payload.message.usage {
                        yield StreamEvent::Usage(Usage {
                            input_tokens: usage.input_tokens,
                            output_tokens: usage.output_tokens,
                        });
                    }
                }
                "content_block_start" => {
                    let payload: ContentBlockStartPayload = parse(&event.data)?;
                    yield StreamEvent::ContentBlockStart {
                        index: payload.index,
                        content_type: payload.content_block.type_name().to_string(),
                    };
                }
                "content_block_delta" => {
                    let payload: ContentBlockDeltaPayload = parse(&event.data)?;
                    match payload.delta {
                        AnthropicDelta::TextDelta { text } => {
                            yield StreamEvent::TextDelta {
                                index: payload.index,
                                text,
                            };
                        }
                        AnthropicDelta::ThinkingDelta { thinking } => {
                            yield StreamEvent::ThinkingDelta {
                                index: payload.index,
                                thinking,
                            };
                        }
                        AnthropicDelta::SignatureDelta { .. } => {}
                    }
                }
                "content_block_stop" => {
                    let payload: ContentBlockStopPayload = parse(&event.data)?;
                    yield StreamEvent::ContentBlockStop {
                        index: payload.index,
                    };
                }
                "message_delta" => {
                    let payload: MessageDeltaPayload = parse(&event.data)?;
                    yield StreamEvent::MessageDelta {
                        stop_reason: map_stop_reason(payload.delta.stop_reason.as_deref()),
                    };
                    yield StreamEvent::Usage(Usage {
                        input_tokens: payload.usage.input_tokens,
                        output_tokens: payload.usage.output_tokens,
                    });
                }
                "message_stop" => {
                    yield StreamEvent::Done;
                    break;
                }
                "ping" => {}
                "error" => {
                    let payload: ErrorPayload = parse(&event.data)?;
                    Err(map_api_error(payload.error))?;
                }
                other => {
                    trace!(event = other, "ignoring unknown sse event");
                }
            }
        }
    })
}

/// Deserialize one SSE data payload.
fn parse<T: serde::de::DeserializeOwned>(data: &str) -> Result<T, LlmError> {
    serde_json::from_str(data)
        .map_err(|e| LlmError::Deserialization(format!("failed to parse sse payload: {e}")))
}

/// Map Anthropic's stop_reason string to the generic enum.
fn map_stop_reason(raw: Option<&str>) -> StopReason {
    match raw {
        Some("max_tokens") => StopReason::MaxTokens,
        Some("stop_sequence") => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}

/// Map a mid-stream `error` event to an [`LlmError`].
fn map_api_error(error: AnthropicError) -> LlmError {
    match error.error_type.as_str() {
        "authentication_error" => LlmError::AuthenticationFailed,
        "rate_limit_error" => LlmError::RateLimited {
            retry_after_ms: None,
        },
        "overloaded_error" => LlmError::Overloaded(error.message),
        "invalid_request_error" => LlmError::InvalidRequest(error.message),
        _ => LlmError::Provider {
            message: format!("{}: {}", error.error_type, error.message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_stop_reason() {
        assert_eq!(map_stop_reason(Some("end_turn")), StopReason::EndTurn);
        assert_eq!(map_stop_reason(Some("max_tokens")), StopReason::MaxTokens);
        assert_eq!(
            map_stop_reason(Some("stop_sequence")),
            StopReason::StopSequence
        );
        assert_eq!(map_stop_reason(None), StopReason::EndTurn);
        assert_eq!(map_stop_reason(Some("unknown")), StopReason::EndTurn);
    }

    #[test]
    fn test_map_api_error_overloaded() {
        let err = map_api_error(AnthropicError {
            error_type: "overloaded_error".to_string(),
            message: "Server busy".to_string(),
        });
        assert!(matches!(err, LlmError::Overloaded(msg) if msg == "Server busy"));
    }

    #[test]
    fn test_map_api_error_authentication() {
        let err = map_api_error(AnthropicError {
            error_type: "authentication_error".to_string(),
            message: "bad key".to_string(),
        });
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[test]
    fn test_map_api_error_unknown_type() {
        let err = map_api_error(AnthropicError {
            error_type: "api_error".to_string(),
            message: "boom".to_string(),
        });
        assert!(matches!(err, LlmError::Provider { message } if message.contains("api_error")));
    }

    #[test]
    fn test_parse_rejects_malformed_payload() {
        let result: Result<MessageStartPayload, _> = parse("not json");
        assert!(matches!(result, Err(LlmError::Deserialization(_))));
    }

    #[tokio::test]
    async fn test_non_success_status_yields_single_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(
                    b"HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )
                .await
                .unwrap();
        });

        let client = reqwest::Client::new();
        let body = AnthropicRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 16,
            messages: vec![],
            system: None,
            stream: true,
            temperature: None,
        };
        let api_key = SecretString::from("test-key-not-real");
        let url = format!("http://{addr}/v1/messages");

        let mut stream = create_anthropic_stream(&client, &url, body, &api_key);
        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(LlmError::AuthenticationFailed)));
        // The error terminates the stream; no Connected or further events.
        assert!(stream.next().await.is_none());

        server.await.unwrap();
    }
}
