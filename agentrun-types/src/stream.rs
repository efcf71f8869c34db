//! Chunk-level streaming types consumed by the stream reader.
//!
//! A backend's `chat_stream` produces a lazy sequence of [`StreamEvent`]s;
//! the reader aggregates content deltas and demultiplexes interleaved
//! tool-call deltas by `id` before synthesizing a single
//! [`crate::provider::CompletionResponse`].

use crate::message::Message;
use crate::provider::TokenUsage;
use futures::stream::BoxStream;
use std::pin::Pin;

/// One event in a backend's streaming reply.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A content delta to append to the running text buffer.
    TextDelta(String),
    /// A reasoning/thinking delta (reasoning-capable models only).
    ThinkingDelta(String),
    /// A cryptographic signature accompanying a thinking block.
    SignatureDelta(String),
    /// A new tool call has begun; `id` demultiplexes subsequent deltas
    /// when multiple tool calls stream in parallel.
    ToolUseStart {
        /// The call's id.
        id: String,
        /// The tool's name.
        name: String,
    },
    /// Another fragment of one tool call's JSON argument string.
    ToolUseInputDelta {
        /// The call this delta belongs to.
        id: String,
        /// The argument-string fragment.
        delta: String,
    },
    /// A tool call's argument stream is complete.
    ToolUseEnd {
        /// The call that finished.
        id: String,
    },
    /// Cumulative usage reported mid-stream or at stream end.
    Usage(TokenUsage),
    /// The backend's own synthesized final message, when it sends one
    /// directly rather than requiring the reader to assemble deltas.
    MessageComplete(Message),
    /// A transport or backend-side error terminating the stream.
    Error(StreamError),
}

/// An error occurring during stream consumption, distinguished from a
/// normal end-of-stream so the orchestrator can tell "ended early" from
/// "errored".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamError {
    /// Human-readable description.
    pub message: String,
    /// Whether the caller might succeed by retrying the call.
    pub is_retryable: bool,
}

impl StreamError {
    /// Build a non-retryable stream error.
    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_retryable: false }
    }

    /// Build a retryable stream error.
    pub fn retryable(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_retryable: true }
    }
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StreamError {}

/// A live handle onto a backend's stream of [`StreamEvent`]s.
pub struct StreamHandle {
    /// The underlying event stream.
    pub receiver: Pin<Box<BoxStream<'static, StreamEvent>>>,
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_error_constructors() {
        let e = StreamError::retryable("rate limited");
        assert!(e.is_retryable);
        assert_eq!(e.to_string(), "rate limited");

        let e = StreamError::non_retryable("bad api key");
        assert!(!e.is_retryable);
    }

    #[test]
    fn tool_use_deltas_demux_by_id() {
        let events = vec![
            StreamEvent::ToolUseStart { id: "t1".into(), name: "search".into() },
            StreamEvent::ToolUseStart { id: "t2".into(), name: "read".into() },
            StreamEvent::ToolUseInputDelta { id: "t1".into(), delta: "{\"q\":".into() },
            StreamEvent::ToolUseInputDelta { id: "t2".into(), delta: "{\"p\":".into() },
            StreamEvent::ToolUseInputDelta { id: "t1".into(), delta: "1}".into() },
            StreamEvent::ToolUseEnd { id: "t1".into() },
        ];
        let t1: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ToolUseInputDelta { id, delta } if id == "t1" => Some(delta.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(t1, "{\"q\":1}");
    }
}
