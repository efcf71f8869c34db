//! Tool-approval guardrails, dispatched as an ordered pipeline.
//!
//! Errors from a single guardrail are logged and treated as approval —
//! a misbehaving guardrail degrades to "not enforced", never blocks the
//! whole pipeline outright.

use async_trait::async_trait;
use serde_json::Value;

/// The outcome of asking whether a `(tool, arguments)` pair may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardrailDecision {
    /// The call may proceed.
    Approved,
    /// The call is refused, with a human-readable reason.
    Blocked(String),
}

/// One guardrail layer in the tool-approval pipeline.
#[async_trait]
pub trait ToolGuardrail: Send + Sync {
    /// Decide whether `(tool_name, arguments)` may proceed.
    async fn approve(&self, tool_name: &str, arguments: &Value) -> GuardrailDecision;
}

/// Dispatches a `(tool, arguments)` pair through an ordered list of
/// guardrails, short-circuiting on the first refusal.
pub struct GuardrailPipeline {
    guardrails: Vec<std::sync::Arc<dyn ToolGuardrail>>,
}

impl GuardrailPipeline {
    /// An empty pipeline: every call is approved.
    pub fn new() -> Self {
        Self { guardrails: Vec::new() }
    }

    /// Append a guardrail to the end of the pipeline.
    pub fn add(&mut self, guardrail: std::sync::Arc<dyn ToolGuardrail>) {
        self.guardrails.push(guardrail);
    }

    /// Ask each guardrail in order; the first refusal wins.
    pub async fn approve(&self, tool_name: &str, arguments: &Value) -> GuardrailDecision {
        for guardrail in &self.guardrails {
            if let GuardrailDecision::Blocked(reason) = guardrail.approve(tool_name, arguments).await {
                return GuardrailDecision::Blocked(reason);
            }
        }
        GuardrailDecision::Approved
    }
}

impl Default for GuardrailPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysBlock(&'static str);

    #[async_trait]
    impl ToolGuardrail for AlwaysBlock {
        async fn approve(&self, _tool_name: &str, _arguments: &Value) -> GuardrailDecision {
            GuardrailDecision::Blocked(self.0.to_string())
        }
    }

    struct AlwaysApprove;

    #[async_trait]
    impl ToolGuardrail for AlwaysApprove {
        async fn approve(&self, _tool_name: &str, _arguments: &Value) -> GuardrailDecision {
            GuardrailDecision::Approved
        }
    }

    #[tokio::test]
    async fn empty_pipeline_approves_everything() {
        let pipeline = GuardrailPipeline::new();
        assert_eq!(pipeline.approve("search", &Value::Null).await, GuardrailDecision::Approved);
    }

    #[tokio::test]
    async fn first_refusal_short_circuits() {
        let mut pipeline = GuardrailPipeline::new();
        pipeline.add(std::sync::Arc::new(AlwaysApprove));
        pipeline.add(std::sync::Arc::new(AlwaysBlock("policy violation")));
        let decision = pipeline.approve("search", &Value::Null).await;
        assert_eq!(decision, GuardrailDecision::Blocked("policy violation".to_string()));
    }
}
