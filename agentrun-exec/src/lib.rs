//! Tool dispatch and stream aggregation for the agentrun execution core.

pub mod executor;
pub mod guardrail;
pub mod sandbox;
pub mod stream_reader;

pub use executor::ToolExecutor;
pub use guardrail::{GuardrailDecision, GuardrailPipeline, ToolGuardrail};
pub use sandbox::{CommandResult, CommandSpec, SandboxManager};
pub use stream_reader::read_stream;
