//! Aggregates a backend's streaming reply into the same
//! [`CompletionResponse`] shape the non-streaming path produces.

use agentrun_types::message::{Message, ToolCall};
use agentrun_types::provider::{CompletionResponse, FinishReason, TokenUsage};
use agentrun_types::stream::{StreamError, StreamEvent, StreamHandle};
use futures_util::StreamExt;
use std::collections::HashMap;

/// Invoked for each non-empty content-text delta as it arrives.
pub type TokenCallback<'a> = &'a (dyn Fn(&str) + Send + Sync);

#[derive(Default)]
struct InProgressToolCall {
    name: String,
    arguments: String,
}

/// Consumes a [`StreamHandle`] to a single synthesized
/// [`CompletionResponse`], or a [`StreamError`] if the stream itself
/// errored (as opposed to ending normally, possibly early).
pub async fn read_stream(
    mut handle: StreamHandle,
    on_token: Option<TokenCallback<'_>>,
    fallback_messages: &[Message],
) -> Result<CompletionResponse, StreamError> {
    let mut content = String::new();
    let mut tool_calls: HashMap<String, InProgressToolCall> = HashMap::new();
    let mut tool_order: Vec<String> = Vec::new();
    let mut finish_reason = FinishReason::Stop;
    let mut usage: Option<TokenUsage> = None;
    let mut synthesized: Option<Message> = None;

    while let Some(event) = handle.receiver.next().await {
        match event {
            StreamEvent::TextDelta(delta) => {
                if !delta.is_empty() {
                    if let Some(cb) = on_token {
                        cb(&delta);
                    }
                    content.push_str(&delta);
                }
            }
            StreamEvent::ThinkingDelta(_) | StreamEvent::SignatureDelta(_) => {}
            StreamEvent::ToolUseStart { id, name } => {
                tool_order.push(id.clone());
                tool_calls.insert(id, InProgressToolCall { name, arguments: String::new() });
            }
            StreamEvent::ToolUseInputDelta { id, delta } => {
                if let Some(call) = tool_calls.get_mut(&id) {
                    call.arguments.push_str(&delta);
                }
            }
            StreamEvent::ToolUseEnd { .. } => {}
            StreamEvent::Usage(u) => usage = Some(u),
            StreamEvent::MessageComplete(message) => synthesized = Some(message),
            StreamEvent::Error(err) => return Err(err),
        }
    }

    if !tool_order.is_empty() {
        finish_reason = FinishReason::ToolCalls;
    }

    let final_tool_calls: Vec<ToolCall> = tool_order
        .into_iter()
        .filter_map(|id| {
            let call = tool_calls.remove(&id)?;
            let arguments = serde_json::from_str(&call.arguments).unwrap_or(serde_json::Value::Null);
            Some(ToolCall { id, name: call.name, arguments })
        })
        .collect();

    let usage = usage.unwrap_or_else(|| fallback_usage(fallback_messages, &content));

    Ok(CompletionResponse {
        id: synthesized
            .as_ref()
            .map(|_| "stream".to_string())
            .unwrap_or_else(|| "stream".to_string()),
        content: synthesized.map(|m| m.content.as_text()).unwrap_or(content),
        tool_calls: final_tool_calls,
        finish_reason,
        usage,
    })
}

fn fallback_usage(messages: &[Message], content: &str) -> TokenUsage {
    let input_tokens = messages.iter().map(|m| estimate_tokens(&m.content.as_text())).sum::<u64>();
    let output_tokens = content.len().div_ceil(4) as u64;
    TokenUsage { input_tokens, output_tokens }
}

fn estimate_tokens(text: &str) -> u64 {
    text.len().div_ceil(4) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentrun_types::stream::StreamEvent;
    use futures::stream;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn handle_from(events: Vec<StreamEvent>) -> StreamHandle {
        StreamHandle { receiver: Pin::new(Box::new(stream::iter(events).boxed())) }
    }

    #[tokio::test]
    async fn concatenates_text_deltas_and_invokes_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let on_token = move |_: &str| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        };
        let handle = handle_from(vec![
            StreamEvent::TextDelta("Hel".to_string()),
            StreamEvent::TextDelta("lo".to_string()),
        ]);
        let response = read_stream(handle, Some(&on_token), &[]).await.unwrap();
        assert_eq!(response.content, "Hello");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(response.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn demuxes_parallel_tool_call_deltas_by_id() {
        let handle = handle_from(vec![
            StreamEvent::ToolUseStart { id: "t1".into(), name: "search".into() },
            StreamEvent::ToolUseStart { id: "t2".into(), name: "read".into() },
            StreamEvent::ToolUseInputDelta { id: "t1".into(), delta: "{\"q\":".into() },
            StreamEvent::ToolUseInputDelta { id: "t2".into(), delta: "{\"p\":".into() },
            StreamEvent::ToolUseInputDelta { id: "t1".into(), delta: "1}".into() },
            StreamEvent::ToolUseInputDelta { id: "t2".into(), delta: "2}".into() },
            StreamEvent::ToolUseEnd { id: "t1".into() },
            StreamEvent::ToolUseEnd { id: "t2".into() },
        ]);
        let response = read_stream(handle, None, &[]).await.unwrap();
        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert_eq!(response.tool_calls.len(), 2);
        assert_eq!(response.tool_calls[0].name, "search");
        assert_eq!(response.tool_calls[0].arguments, serde_json::json!({"q": 1}));
        assert_eq!(response.tool_calls[1].arguments, serde_json::json!({"p": 2}));
    }

    #[tokio::test]
    async fn falls_back_to_estimated_usage_when_absent() {
        let handle = handle_from(vec![StreamEvent::TextDelta("hi there".to_string())]);
        let response = read_stream(handle, None, &[Message::user("hello")]).await.unwrap();
        assert_eq!(response.usage.output_tokens, "hi there".len().div_ceil(4) as u64);
    }

    #[tokio::test]
    async fn stream_error_surfaces_distinctly_from_normal_end() {
        let handle = handle_from(vec![
            StreamEvent::TextDelta("partial".to_string()),
            StreamEvent::Error(StreamError::retryable("connection reset")),
        ]);
        let err = read_stream(handle, None, &[]).await.unwrap_err();
        assert!(err.is_retryable);
    }
}
