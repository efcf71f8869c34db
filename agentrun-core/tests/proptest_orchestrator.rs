//! Property-based tests: orchestrator run invariants.

use agentrun_types::agent::{Agent, RunOptions};
use agentrun_types::config::OrchestratorConfig;
use agentrun_types::error::LlmError;
use agentrun_types::message::{Role, ToolCall};
use agentrun_types::provider::{CompletionRequest, CompletionResponse, FinishReason, Provider, TokenUsage};
use agentrun_types::stream::StreamHandle;
use agentrun_types::tool::{Tool, ToolContext};
use agentrun_core::Orchestrator;
use async_trait::async_trait;
use proptest::prelude::*;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Deserialize, JsonSchema)]
struct NoArgs {}

#[derive(Debug, thiserror::Error)]
#[error("call-me-again failed")]
struct CallMeAgainError;

/// A tool whose only job is to keep the run going.
struct CallMeAgainTool;

#[async_trait]
impl Tool for CallMeAgainTool {
    const NAME: &'static str = "call_me_again";
    type Args = NoArgs;
    type Output = String;
    type Error = CallMeAgainError;

    fn description(&self) -> String {
        "Always asks to be called again".to_string()
    }

    async fn call(&self, _args: Self::Args, _ctx: &ToolContext) -> Result<Self::Output, Self::Error> {
        Ok("call me again".to_string())
    }
}

/// Replays a fixed script of responses, one per `chat` call, cycling to a
/// final `stop` reply once exhausted.
struct ScriptedProvider {
    responses: Mutex<Vec<CompletionResponse>>,
}

impl ScriptedProvider {
    fn new(n_tool_iterations: usize) -> Arc<Self> {
        let mut responses: Vec<CompletionResponse> = (0..n_tool_iterations)
            .map(|i| CompletionResponse {
                id: format!("resp_{i}"),
                content: String::new(),
                tool_calls: vec![ToolCall {
                    id: format!("call_{i}"),
                    name: "call_me_again".into(),
                    arguments: serde_json::json!({}),
                }],
                finish_reason: FinishReason::ToolCalls,
                usage: TokenUsage { input_tokens: 15, output_tokens: 5 },
            })
            .collect();
        responses.push(CompletionResponse {
            id: "resp_final".into(),
            content: "done".to_string(),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
            usage: TokenUsage { input_tokens: 10, output_tokens: 3 },
        });
        Arc::new(Self { responses: Mutex::new(responses) })
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn provider_tag(&self) -> &str {
        "mock"
    }

    async fn chat(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(CompletionResponse {
                id: "resp_overflow".into(),
                content: "done".to_string(),
                tool_calls: Vec::new(),
                finish_reason: FinishReason::Stop,
                usage: TokenUsage { input_tokens: 1, output_tokens: 1 },
            });
        }
        Ok(responses.remove(0))
    }

    async fn chat_stream(&self, _request: CompletionRequest) -> Result<StreamHandle, LlmError> {
        Err(LlmError::InvalidResponse("mock provider does not stream".into()))
    }
}

fn agent_with(max_iterations: u32) -> Agent {
    Agent::builder("assistant", "mock/test-model", "Be brief.")
        .tool(CallMeAgainTool.definition())
        .max_iterations(max_iterations)
        .build()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Invariants 1, 2, 4 and 5: iteration bound, tool-fold consistency,
    /// token accounting and the cost formula, across a run whose backend
    /// may need anywhere from zero to many more tool round-trips than
    /// the agent is allowed to take.
    #[test]
    fn orchestrator_run_invariants_hold(
        max_iterations in 1u32..6,
        n_tool_iterations in 0usize..8,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let provider = ScriptedProvider::new(n_tool_iterations);
            let price_in = Decimal::new(250, 2);
            let price_out = Decimal::new(1000, 2);
            let config = OrchestratorConfig::default().with_price("mock/test-model", price_in, price_out);
            let orchestrator = Orchestrator::builder(config)
                .provider(provider)
                .tool(Arc::new(CallMeAgainTool))
                .build();

            let agent = agent_with(max_iterations);
            let mut options = RunOptions::new("keep going");
            options.use_memory = false;

            match orchestrator.run(&agent, options).await {
                Ok(result) => {
                    // Invariant 1: the run only completed because it fit
                    // within the iteration bound.
                    prop_assert!((n_tool_iterations as u32) < max_iterations);

                    // Invariant 4: total equals the sum of the parts.
                    prop_assert_eq!(result.usage.total_tokens, result.usage.input_tokens + result.usage.output_tokens);

                    // Invariant 5: the cost formula, applied to the
                    // accumulated tokens with the registered price.
                    let expected_cost = (Decimal::from(result.usage.input_tokens) * price_in
                        + Decimal::from(result.usage.output_tokens) * price_out)
                        / Decimal::new(1_000_000, 0);
                    prop_assert_eq!(result.usage.cost, expected_cost);

                    // Invariant 2: every tool_calls turn is immediately
                    // followed by exactly one tool message per call, in
                    // issuance order, before the next assistant message.
                    let messages = &result.messages;
                    let mut i = 0;
                    while i < messages.len() {
                        if messages[i].role == Role::Assistant {
                            if let Some(calls) = &messages[i].tool_calls {
                                if !calls.is_empty() {
                                    for (offset, call) in calls.iter().enumerate() {
                                        let tool_msg = messages.get(i + 1 + offset);
                                        prop_assert!(tool_msg.is_some(), "missing folded tool result for call {}", call.id);
                                        let tool_msg = tool_msg.unwrap();
                                        prop_assert_eq!(tool_msg.role, Role::Tool);
                                        prop_assert_eq!(tool_msg.tool_call_id.as_deref(), Some(call.id.as_str()));
                                    }
                                    i += 1 + calls.len();
                                    continue;
                                }
                            }
                        }
                        i += 1;
                    }
                }
                Err(err) => {
                    // The only expected failure mode here is exhausting
                    // the iteration cap.
                    prop_assert!((n_tool_iterations as u32) >= max_iterations);
                    prop_assert!(matches!(
                        err,
                        agentrun_types::error::RunError::Agent(agentrun_types::error::AgentError::MaxIterations(_))
                    ));
                }
            }
        });
    }
}
