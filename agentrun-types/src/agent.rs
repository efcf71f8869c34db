//! The immutable agent definition and per-run options.

use crate::error::{MemoryError, RunError};
use crate::message::{ToolCall, ToolResult};
use crate::run::RunResult;
use crate::span::Span;
use crate::tool::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A named configuration of `{instructions, model, tools, generation
/// parameters}` the orchestrator can run. Constructed once and shared
/// read-only across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// A `provider/model` identifier, e.g. `"openai/gpt-4o"`.
    pub model: String,
    /// The system prompt text.
    pub instructions: String,
    /// Tool names this agent may call; names must be unique within the
    /// agent (enforced by [`AgentBuilder::tool`]).
    pub tools: Vec<ToolDefinition>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,
    /// Maximum tokens to generate per reply.
    pub max_tokens: Option<u32>,
    /// Sequences that cause generation to stop.
    pub stop_sequences: Vec<String>,
    /// Maximum iterations of the control loop per run.
    pub max_iterations: u32,
    /// Default per-run timeout.
    pub timeout: Duration,
    /// Explicit provider override, bypassing prefix-parsing of `model`.
    pub provider: Option<String>,
}

/// Default temperature, matching the external interface defaults.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;
/// Default run timeout: 120 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(120_000);

impl Agent {
    /// Start building an agent with the given model and instructions.
    pub fn builder(name: impl Into<String>, model: impl Into<String>, instructions: impl Into<String>) -> AgentBuilder {
        AgentBuilder::new(name, model, instructions)
    }
}

/// Builder for [`Agent`], enforcing unique tool names at construction time.
pub struct AgentBuilder {
    id: Option<String>,
    name: String,
    model: String,
    instructions: String,
    tools: Vec<ToolDefinition>,
    temperature: f32,
    top_p: Option<f32>,
    max_tokens: Option<u32>,
    stop_sequences: Vec<String>,
    max_iterations: u32,
    timeout: Duration,
    provider: Option<String>,
}

impl AgentBuilder {
    /// Start a new builder.
    pub fn new(name: impl Into<String>, model: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            model: model.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: None,
            max_tokens: None,
            stop_sequences: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            timeout: DEFAULT_TIMEOUT,
            provider: None,
        }
    }

    /// Set an explicit id (otherwise one is derived from `name`).
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add one tool, replacing any earlier tool of the same name.
    pub fn tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.retain(|t| t.name != tool.name);
        self.tools.push(tool);
        self
    }

    /// Add several tools.
    pub fn tools(mut self, tools: impl IntoIterator<Item = ToolDefinition>) -> Self {
        for t in tools {
            self = self.tool(t);
        }
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    /// Set the max iteration bound.
    pub fn max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    /// Set the default per-run timeout.
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Override provider resolution.
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Finish building.
    pub fn build(self) -> Agent {
        let id = self.id.unwrap_or_else(|| self.name.clone());
        Agent {
            id,
            name: self.name,
            model: self.model,
            instructions: self.instructions,
            tools: self.tools,
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            stop_sequences: self.stop_sequences,
            max_iterations: self.max_iterations,
            timeout: self.timeout,
            provider: self.provider,
        }
    }
}

/// Caller-supplied per-run options. See the external interface for
/// recognized fields and defaults; callback fields are represented as
/// trait objects rather than function pointers so closures may capture
/// state.
pub struct RunOptions {
    /// The user's input text.
    pub input: String,
    /// Attached image URLs or base64 blobs, appended after the text part.
    pub images: Vec<crate::message::ContentPart>,
    /// Pre-transcribed audio text, prepended to the text part.
    pub audio_transcript: Option<String>,
    /// Extra key-value context spliced into the system message.
    pub context: HashMap<String, Value>,
    /// Memory scope to read/write; minted if absent.
    pub thread_id: Option<String>,
    /// Overrides [`Agent::timeout`] for this run.
    pub timeout: Option<Duration>,
    /// Use the streaming path when a token callback is also set.
    pub stream: bool,
    /// Use memory for this run at all.
    pub use_memory: bool,
    /// Load history into the initial prompt.
    pub load_history: bool,
    /// Persist this run's turns to memory.
    pub save_history: bool,
    /// Dispatch an iteration's tool calls concurrently rather than
    /// sequentially.
    pub parallel_tool_calls: bool,
    /// Fired for each non-empty content-text delta during a streaming run.
    pub on_token: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    /// Fired once a tool call is parsed out of the model's reply, before
    /// dispatch.
    pub on_tool_call: Option<Arc<dyn Fn(&ToolCall) + Send + Sync>>,
    /// Fired once a tool call's result is known, before it is folded
    /// back into the transcript.
    pub on_tool_result: Option<Arc<dyn Fn(&ToolResult) + Send + Sync>>,
    /// Fired once at run start with the minted run id.
    pub on_run_start: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    /// Fired once with the finished result, on success only.
    pub on_run_complete: Option<Arc<dyn Fn(&RunResult) + Send + Sync>>,
    /// Fired once with the error and run id, on failure only.
    pub on_run_error: Option<Arc<dyn Fn(&RunError, &str) + Send + Sync>>,
    /// Fired for every span as it is recorded.
    pub on_span: Option<Arc<dyn Fn(&Span) + Send + Sync>>,
    /// Fired for every non-fatal memory-adapter error.
    pub on_memory_error: Option<Arc<dyn Fn(&MemoryError) + Send + Sync>>,
}

impl RunOptions {
    /// Build options from bare input text, with every other field at its
    /// external-interface default.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            images: Vec::new(),
            audio_transcript: None,
            context: HashMap::new(),
            thread_id: None,
            timeout: None,
            stream: false,
            use_memory: true,
            load_history: true,
            save_history: true,
            parallel_tool_calls: false,
            on_token: None,
            on_tool_call: None,
            on_tool_result: None,
            on_run_start: None,
            on_run_complete: None,
            on_run_error: None,
            on_span: None,
            on_memory_error: None,
        }
    }
}
