//! The structured trace record: one node per timed operation inside a
//! run, independent of the ambient `tracing` events the same operations
//! also emit.

use crate::duration::DurationMs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The OpenTelemetry-style span kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// Internal work with no remote counterpart.
    Internal,
    /// An outbound call this process makes.
    Client,
    /// An inbound call this process serves.
    Server,
    /// Fire-and-forget dispatch.
    Producer,
    /// Consumption of a fire-and-forget dispatch.
    Consumer,
}

/// Terminal status of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStatus {
    /// Completed successfully.
    Ok,
    /// Completed with an error.
    Error,
    /// No status was set.
    Unset,
}

/// One node of a trace tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Freshly minted on construction.
    pub id: String,
    /// The trace this span belongs to.
    pub trace_id: String,
    /// The enclosing span, if any. Absent only for the root `agent.run`
    /// span.
    pub parent_id: Option<String>,
    /// The span's name, e.g. `"llm.chat"` or `"tool.search"`.
    pub name: String,
    /// Millis since the Unix epoch.
    pub start_time: u64,
    /// Millis since the Unix epoch; `>= start_time`.
    pub end_time: u64,
    /// Attribute bag, e.g. `{"llm.model": "...", "llm.iteration": 2}`.
    pub attributes: HashMap<String, Value>,
    /// Terminal status.
    pub status: SpanStatus,
    /// Span kind.
    pub kind: SpanKind,
}

impl Span {
    /// `end_time - start_time`, as a stable-wire-format duration.
    pub fn duration(&self) -> DurationMs {
        DurationMs::from_millis(self.end_time.saturating_sub(self.start_time))
    }

    /// Whether `other`'s interval is contained within this span's.
    pub fn contains(&self, other: &Span) -> bool {
        self.start_time <= other.start_time && other.end_time <= self.end_time
    }
}

/// A complete trace: the ordered spans recorded during one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// This trace's id.
    pub trace_id: String,
    /// Spans in start order, with the root `agent.run` span always at
    /// index 0.
    pub spans: Vec<Span>,
}
