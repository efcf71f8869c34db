//! Dispatches a single tool call: lookup, argument validation, guardrail
//! approval, then either sandbox or in-process execution. Errors at any
//! stage are folded into a [`ToolResult`] and never raised.

use crate::guardrail::{GuardrailDecision, ToolGuardrail};
use crate::sandbox::{CommandSpec, SandboxManager};
use agentrun_trace::SpanRecorder;
use agentrun_types::duration::now_millis;
use agentrun_types::message::{ToolCall, ToolResult};
use agentrun_types::span::{SpanKind, SpanStatus};
use agentrun_types::tool::{SandboxDescriptor, ToolContext};
use agentrun_tool::ToolRegistry;
use serde_json::Value;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Dispatches tool calls against a [`ToolRegistry`], applying an optional
/// guardrail pipeline and an optional sandbox manager.
pub struct ToolExecutor {
    filter_enabled: bool,
}

impl ToolExecutor {
    /// `filter_enabled` gates whether guardrail approval runs at all;
    /// when `false` every call skips straight to dispatch.
    pub fn new(filter_enabled: bool) -> Self {
        Self { filter_enabled }
    }

    /// Dispatch one tool call.
    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        registry: &ToolRegistry,
        tool_call: &ToolCall,
        run_id: &str,
        agent_id: &str,
        sandbox: Option<&dyn SandboxManager>,
        guardrail: Option<&dyn ToolGuardrail>,
        cancellation: CancellationToken,
        recorder: Option<(&SpanRecorder, &str)>,
    ) -> ToolResult {
        let Some(tool) = registry.get(&tool_call.name).cloned() else {
            return ToolResult::failed(
                tool_call.id.clone(),
                tool_call.name.clone(),
                format!("Tool not found: {}", tool_call.name),
            );
        };

        if self.filter_enabled {
            if let Some(guardrail) = guardrail {
                if let GuardrailDecision::Blocked(reason) =
                    guardrail.approve(&tool_call.name, &tool_call.arguments).await
                {
                    return ToolResult::failed(
                        tool_call.id.clone(),
                        tool_call.name.clone(),
                        format!("Tool blocked: {reason}"),
                    );
                }
            }
        }

        let ctx = ToolContext {
            agent_id: agent_id.to_string(),
            run_id: run_id.to_string(),
            cancellation,
        };

        let start = now_millis();
        let dispatch = self.dispatch(&tool, tool_call, sandbox, &ctx).await;
        let end = now_millis();

        let (result, status) = match dispatch {
            Ok(value) => (ToolResult::ok(tool_call.id.clone(), tool_call.name.clone(), value), SpanStatus::Ok),
            Err(message) => (
                ToolResult::failed(tool_call.id.clone(), tool_call.name.clone(), message),
                SpanStatus::Error,
            ),
        };

        if let Some((recorder, parent_id)) = recorder {
            let mut attributes = HashMap::new();
            attributes.insert("tool.name".to_string(), Value::String(tool_call.name.clone()));
            attributes.insert("tool.call_id".to_string(), Value::String(tool_call.id.clone()));
            attributes.insert("tool.is_error".to_string(), Value::Bool(result.is_error()));
            recorder.record(
                format!("tool.{}", tool_call.name),
                Some(parent_id.to_string()),
                start,
                end,
                attributes,
                status,
                SpanKind::Internal,
            );
        }

        result
    }

    async fn dispatch(
        &self,
        tool: &std::sync::Arc<dyn agentrun_types::tool::ToolDyn>,
        tool_call: &ToolCall,
        sandbox: Option<&dyn SandboxManager>,
        ctx: &ToolContext,
    ) -> Result<Value, String> {
        let definition = tool.definition();
        match (&definition.sandbox, sandbox) {
            (Some(descriptor), Some(sandbox)) => {
                match self.dispatch_sandboxed(descriptor, tool_call, sandbox).await {
                    Ok(value) => Ok(value),
                    Err(sandbox_err) if is_unavailable(&sandbox_err) => {
                        tracing::warn!(
                            tool = %tool_call.name,
                            error = %sandbox_err,
                            "sandbox unavailable, falling back to native execution"
                        );
                        tool.call_dyn(tool_call.arguments.clone(), ctx).await.map_err(|e| e.to_string())
                    }
                    Err(sandbox_err) => Err(sandbox_err),
                }
            }
            (Some(_), None) => {
                tracing::warn!(tool = %tool_call.name, "sandbox descriptor present but no sandbox configured, running natively");
                tool.call_dyn(tool_call.arguments.clone(), ctx).await.map_err(|e| e.to_string())
            }
            (None, _) => tool.call_dyn(tool_call.arguments.clone(), ctx).await.map_err(|e| e.to_string()),
        }
    }

    async fn dispatch_sandboxed(
        &self,
        descriptor: &SandboxDescriptor,
        tool_call: &ToolCall,
        sandbox: &dyn SandboxManager,
    ) -> Result<Value, String> {
        match descriptor {
            SandboxDescriptor::Command => {
                let args = tool_call.arguments.as_object().cloned().unwrap_or_default();
                let command = args
                    .get("command")
                    .and_then(Value::as_str)
                    .ok_or_else(|| "missing `command` argument".to_string())?
                    .to_string();
                let cwd = args.get("cwd").and_then(Value::as_str).map(str::to_string);
                let env = args
                    .get("env")
                    .and_then(Value::as_object)
                    .map(|m| {
                        m.iter()
                            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                            .collect()
                    })
                    .unwrap_or_default();
                let timeout = args
                    .get("timeout")
                    .and_then(Value::as_u64)
                    .map(std::time::Duration::from_millis);
                let spec = CommandSpec { command, cwd, env, timeout };
                let result = sandbox.run_command(spec).await.map_err(|e| e.to_string())?;
                Ok(serde_json::json!({
                    "stdout": result.stdout,
                    "stderr": result.stderr,
                    "exitCode": result.exit_code,
                    "timedOut": result.timed_out,
                    "duration": result.duration.as_millis() as u64,
                    "command": result.command,
                }))
            }
            SandboxDescriptor::Module { name } => sandbox
                .run_module(name, tool_call.arguments.clone())
                .await
                .map_err(|e| e.to_string()),
        }
    }
}

fn is_unavailable(message: &str) -> bool {
    message.to_lowercase().contains("unavailable")
}
