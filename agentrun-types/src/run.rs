//! The result of one run: the public, immutable record the orchestrator
//! hands back to the caller.

use crate::duration::DurationMs;
use crate::message::{Message, ToolCall};
use crate::span::Trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Token and cost accounting for one completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunUsage {
    /// Prompt tokens summed across every iteration.
    pub input_tokens: u64,
    /// Completion tokens summed across every iteration.
    pub output_tokens: u64,
    /// `input_tokens + output_tokens`.
    pub total_tokens: u64,
    /// `(input_tokens*price_in + output_tokens*price_out) / 1_000_000`,
    /// or zero when pricing for `modelUsed` is unknown.
    pub cost: Decimal,
    /// Wall-clock duration of the whole run.
    pub duration: DurationMs,
}

/// The immutable outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// The final assistant text.
    pub output: String,
    /// This run's id.
    pub run_id: String,
    /// The agent that was run.
    pub agent_id: String,
    /// The memory scope this run read/wrote.
    pub thread_id: String,
    /// The model actually used (after routing).
    pub model_used: String,
    /// Token and cost accounting.
    pub usage: RunUsage,
    /// Every tool invocation, in issuance order.
    pub tool_calls: Vec<ToolCall>,
    /// The final transcript.
    pub messages: Vec<Message>,
    /// The structured trace recorded during this run.
    pub trace: Trace,
}
