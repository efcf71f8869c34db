#![deny(missing_docs)]
//! # agentrun — umbrella crate
//!
//! A single import surface over the agent execution core: data model
//! and error taxonomy ([`agentrun_types`]), the tool registry
//! ([`agentrun_tool`]), the span recorder ([`agentrun_trace`]), the
//! message builder and memory contract ([`agentrun_context`]), tool
//! dispatch and stream aggregation ([`agentrun_exec`]), checkpoint
//! storage and replay ([`agentrun_checkpoint`]), cost estimation and
//! routing ([`agentrun_cost`]), and the run orchestrator
//! ([`agentrun_core`]). See [`prelude`] for the happy path.

pub use agentrun_checkpoint;
pub use agentrun_context;
pub use agentrun_core;
pub use agentrun_cost;
pub use agentrun_exec;
pub use agentrun_tool;
pub use agentrun_trace;
pub use agentrun_types;

/// Happy-path imports for composing and running agents.
pub mod prelude {
    pub use agentrun_types::prelude::*;

    pub use agentrun_tool::ToolRegistry;

    pub use agentrun_trace::{SpanObserver, SpanRecorder};

    pub use agentrun_context::{ContextStrategy, MemoryAdapter, MessageBuilder, NoCompaction, SlidingWindow};

    pub use agentrun_exec::{
        read_stream, CommandResult, CommandSpec, GuardrailDecision, GuardrailPipeline,
        SandboxManager, ToolExecutor, ToolGuardrail,
    };

    pub use agentrun_checkpoint::{
        compare_traces, deterministic_replay, fork, fork_and_replay, live_replay, CheckpointStore,
        ForkOptions, InMemoryCheckpointStore, ReplayOverrides, RunFromTranscript,
    };

    pub use agentrun_cost::{
        analyze, estimate_cost, route, Complexity, CostBreakdown, CostEstimate, CostSensitivity,
        CostSummary, EstimateOptions, RouteRequest, SpendLedger, TaskHints,
    };

    pub use agentrun_core::{
        GuardrailEngine, InjectionVerdict, InputVerdict, NoopReflection, Orchestrator,
        OrchestratorBuilder, OutputVerdict, ReflectionEngine, RunTrigger, ToolReflectionRecord,
    };
}
