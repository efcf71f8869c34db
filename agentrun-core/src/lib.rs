//! The run orchestrator: cancellation, guardrails, reflection, and the
//! control loop tying the rest of the agentrun execution core together.

pub mod cancellation;
pub mod guardrail;
pub mod orchestrator;
pub mod reflection;

pub use cancellation::RunTrigger;
pub use guardrail::{GuardrailEngine, InjectionVerdict, InputVerdict, OutputVerdict};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use reflection::{NoopReflection, ReflectionEngine, ToolReflectionRecord};
