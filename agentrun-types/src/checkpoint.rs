//! The self-contained per-step snapshot that makes replay and forking
//! possible.

use crate::message::{Message, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A self-contained snapshot of a run at a numbered step.
///
/// Replaying from a checkpoint requires no other state: `messages`,
/// `tool_results` and `pending_tool_calls` are enough to reconstruct the
/// transcript and, for live replay, resume the control loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// This checkpoint's id.
    pub id: String,
    /// The trace the originating run recorded up to this step.
    pub trace_id: String,
    /// The run this checkpoint was captured from.
    pub run_id: String,
    /// The agent that was running.
    pub agent_id: String,
    /// The iteration index this checkpoint was captured after.
    pub step_index: u32,
    /// The transcript as of this step.
    pub messages: Vec<Message>,
    /// Cached tool results, keyed by call id.
    pub tool_results: HashMap<String, Value>,
    /// Tool calls issued but not yet folded back, if captured mid-iteration.
    pub pending_tool_calls: Vec<ToolCall>,
    /// An optional caller-supplied label.
    pub label: Option<String>,
    /// Millis since the Unix epoch.
    pub created_at: u64,
    /// Arbitrary caller metadata, plus `forked_from`/`fork_type` when this
    /// checkpoint originated from [`ForkType`].
    pub metadata: HashMap<String, Value>,
}

/// How a forked checkpoint relates to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkType {
    /// No modification beyond the fork itself.
    Plain,
    /// Additional system context was injected.
    Context,
    /// The last user message was replaced.
    Input,
    /// Tool-result overrides were pre-filled.
    Mocked,
}

/// The outcome of deterministic replay (§4.7): no backend calls, a
/// synthesized result from the checkpoint's own transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayResult {
    /// The checkpoint replayed from.
    pub replayed_from: String,
    /// The originating run's trace id.
    pub original_trace_id: String,
    /// `step_index + 1`.
    pub steps_replayed: u32,
    /// Always zero for deterministic replay.
    pub steps_executed: u32,
    /// Always `None` for deterministic replay; populated by live replay
    /// when the new tool-call sequence diverges from the checkpoint's.
    pub diverged_at: Option<u32>,
}

/// The result classification of comparing two trace steps, used by trace
/// comparison (diagnostic only, not part of the hot path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepComparison {
    /// Byte-identical.
    Identical,
    /// Differs only in LLM-response text.
    Similar,
    /// Tool identity, arguments, or errors disagree.
    Different,
    /// This step exists only in the first trace.
    OnlyIn1,
    /// This step exists only in the second trace.
    OnlyIn2,
}
