//! The backend contract: one LLM provider's `chat` / `chat_stream`
//! surface, plus the request/response shapes the orchestrator builds
//! and consumes each iteration.
//!
//! Unlike a single static provider bound generically per call site, the
//! orchestrator resolves a backend dynamically from an effective model's
//! provider tag and caches it process-wide (§5). That dynamic lookup
//! needs an object-safe trait, so — unlike a from-scratch generic
//! `Provider<P>` bound — this trait is `async-trait`-boxed rather than
//! RPITIT.

use crate::error::LlmError;
use crate::message::Message;
use crate::stream::StreamHandle;
use crate::tool::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool selection strategy requested of the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides whether to use tools.
    Auto,
    /// The model must not use tools.
    None,
    /// The model must use at least one tool.
    Required,
    /// The model must use the named tool.
    Specific {
        /// Name of the required tool.
        name: String,
    },
}

/// Constraint on the shape of the model's reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Unconstrained text.
    Text,
    /// Must be a JSON object (unvalidated against any particular schema).
    JsonObject,
    /// Must conform to `json_schema`. On backends without native support
    /// this is emulated via tool-forcing (§9); see `DESIGN.md` for the
    /// recorded decision on transcript visibility.
    JsonSchema {
        /// The schema candidate replies must satisfy.
        json_schema: Value,
    },
}

/// One call to a backend's non-streaming chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model identifier (without the `provider/` prefix — the
    /// provider already knows which backend it is).
    pub model: String,
    /// The full message list for this iteration.
    pub messages: Vec<Message>,
    /// Declared tool schemas, from the registry's `getSchemas`.
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    /// Tool selection strategy.
    pub tool_choice: Option<ToolChoice>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Stop sequences.
    #[serde(default)]
    pub stop: Vec<String>,
    /// Reply shape constraint.
    pub response_format: Option<ResponseFormat>,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of turn.
    Stop,
    /// The model requested one or more tool calls.
    ToolCalls,
    /// Hit `max_tokens`.
    Length,
    /// The backend errored mid-generation.
    Error,
}

/// Token accounting for one completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub input_tokens: u64,
    /// Tokens in the completion.
    pub output_tokens: u64,
}

impl TokenUsage {
    /// `input_tokens + output_tokens`.
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// The synthesized result of one chat call — identical whether it came
/// from the non-streaming path or was aggregated by the stream reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Backend-assigned response id.
    pub id: String,
    /// The reply text, if any.
    pub content: String,
    /// Tool calls the model requested, if `finish_reason` is
    /// [`FinishReason::ToolCalls`].
    #[serde(default)]
    pub tool_calls: Vec<crate::message::ToolCall>,
    /// Why generation stopped.
    pub finish_reason: FinishReason,
    /// Token accounting for this call.
    pub usage: TokenUsage,
}

/// One LLM provider's `chat` / `chat_stream` surface.
#[async_trait]
pub trait Provider: Send + Sync {
    /// The provider tag this backend answers to, e.g. `"openai"`.
    fn provider_tag(&self) -> &str;

    /// Non-streaming chat call.
    async fn chat(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Streaming chat call; the orchestrator hands the returned handle to
    /// the stream reader.
    async fn chat_stream(&self, request: CompletionRequest) -> Result<StreamHandle, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_usage_total_sums_both_fields() {
        let u = TokenUsage { input_tokens: 10, output_tokens: 5 };
        assert_eq!(u.total(), 15);
    }
}
