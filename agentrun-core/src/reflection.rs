//! Optional post-hoc learning: per-tool-call advisories and end-of-run
//! summaries. Failures here are always non-fatal — warn-logged and
//! swallowed, never surfaced to the caller.

use agentrun_types::run::RunResult;
use async_trait::async_trait;
use serde_json::Value;

/// What happened during one tool dispatch, handed to the reflection
/// engine for optional advisory generation.
#[derive(Debug, Clone)]
pub struct ToolReflectionRecord {
    /// The call's id.
    pub tool_call_id: String,
    /// The tool's name.
    pub tool_name: String,
    /// The arguments it was called with.
    pub input: Value,
    /// The result, if it succeeded.
    pub output: Option<Value>,
    /// The failure message, if it did not.
    pub error: Option<String>,
    /// Wall-clock duration of the dispatch, in milliseconds.
    pub duration_ms: u64,
}

/// Produces advisories during a run and summaries at its end.
#[async_trait]
pub trait ReflectionEngine: Send + Sync {
    /// Inspect one completed tool dispatch; may return a `system`
    /// advisory message to splice into the transcript.
    async fn on_tool_call(&self, record: &ToolReflectionRecord) -> Result<Option<String>, String>;

    /// Summarize a completed run, e.g. for later insight retrieval.
    async fn summarize(&self, result: &RunResult) -> Result<Option<String>, String>;
}

/// A reflection engine that never produces advisories or summaries.
pub struct NoopReflection;

#[async_trait]
impl ReflectionEngine for NoopReflection {
    async fn on_tool_call(&self, _record: &ToolReflectionRecord) -> Result<Option<String>, String> {
        Ok(None)
    }

    async fn summarize(&self, _result: &RunResult) -> Result<Option<String>, String> {
        Ok(None)
    }
}
