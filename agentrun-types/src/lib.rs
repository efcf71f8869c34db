//! Core data model, error taxonomy, and protocol traits for the
//! agentrun execution core.
//!
//! This crate owns the types every other `agentrun-*` crate shares:
//! the transcript ([`message`]), the agent definition and run options
//! ([`agent`]), the tool contract ([`tool`]), the backend contract
//! ([`provider`], [`stream`]), the structured trace record ([`span`]),
//! the run result ([`run`]), checkpoints ([`checkpoint`]), typed ids
//! ([`id`]), a stable duration wire format ([`duration`]), the error
//! taxonomy ([`error`]), and process-wide configuration ([`config`]).

pub mod agent;
pub mod checkpoint;
pub mod config;
pub mod duration;
pub mod error;
pub mod id;
pub mod message;
pub mod provider;
pub mod run;
pub mod span;
pub mod stream;
pub mod tool;

/// Re-exports of the most commonly used types, for `use agentrun_types::prelude::*;`.
pub mod prelude {
    pub use crate::agent::{Agent, AgentBuilder, RunOptions};
    pub use crate::checkpoint::{Checkpoint, ForkType, ReplayResult, StepComparison};
    pub use crate::config::OrchestratorConfig;
    pub use crate::duration::{now_millis, DurationMs};
    pub use crate::error::{
        AgentError, Cancelled, GenericError, LlmError, MemoryError, PolicyError, RunError,
        SandboxError, ToolError,
    };
    pub use crate::id::{AgentId, CheckpointId, RunId, SpanId, ThreadId, ToolCallId, TraceId};
    pub use crate::message::{Content, ContentPart, Message, Role, ToolCall, ToolResult};
    pub use crate::provider::{
        CompletionRequest, CompletionResponse, FinishReason, Provider, ResponseFormat, TokenUsage,
        ToolChoice,
    };
    pub use crate::run::{RunResult, RunUsage};
    pub use crate::span::{Span, SpanKind, SpanStatus, Trace};
    pub use crate::stream::{StreamError, StreamEvent, StreamHandle};
    pub use crate::tool::{SideEffect, Tool, ToolContext, ToolDefinition, ToolDyn};
}
