//! The tool contract: a typed, schema-validated [`Tool`] trait plus its
//! object-safe [`ToolDyn`] projection for heterogeneous registries.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A side effect a tool's `execute` may perform, used for guardrail
/// policy decisions and operator-facing documentation. Not enforced by
/// the executor itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    /// Reads or writes the filesystem.
    Filesystem,
    /// Performs network I/O.
    Network,
    /// Reads or writes a database.
    Database,
    /// Spawns or controls a process.
    Process,
}

/// How a tool's `execute` should be dispatched by the sandbox executor
/// rather than run in-process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SandboxDescriptor {
    /// Arguments describe a shell command (`command`, optional `cwd`,
    /// `env`, `timeout`) run by the sandbox manager.
    Command,
    /// JSON-serialized arguments are piped to a named sandbox module as
    /// standard input; its standard output is the result.
    Module {
        /// The module's name, as known to the sandbox manager.
        name: String,
    },
}

/// The JSON-Schema-compatible description of a tool, as exposed to a
/// backend's function-calling channel and the tool registry's
/// `getSchemas`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name within a registry.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema the tool's arguments must satisfy.
    pub parameters: Value,
    /// Side effects this tool's `execute` may perform.
    #[serde(default)]
    pub side_effects: HashSet<SideEffect>,
    /// Per-call timeout, if the tool declares one.
    #[serde(default, skip_serializing)]
    pub timeout: Option<Duration>,
    /// Routes dispatch through the sandbox executor instead of
    /// in-process execution, when present.
    #[serde(default)]
    pub sandbox: Option<SandboxDescriptor>,
}

impl ToolDefinition {
    /// Project this definition into the `{name, description, parameters}`
    /// object shape a backend's function-calling request expects.
    pub fn to_backend_json(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters,
        })
    }
}

/// Runtime context handed to a tool's `execute`.
pub struct ToolContext {
    /// The agent running this tool.
    pub agent_id: String,
    /// The run invoking this tool.
    pub run_id: String,
    /// Cooperative cancellation, composed from the run's trigger.
    pub cancellation: CancellationToken,
}

/// A statically typed tool: argument validation is "is this JSON
/// deserializable as `Args`", matching the spec's `safeParse` contract
/// without a separate schema-validation dependency.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique, stable name.
    const NAME: &'static str;
    /// Deserializable, schema-describable argument type.
    type Args: DeserializeOwned + schemars::JsonSchema + Send;
    /// Serializable success type.
    type Output: Serialize + Send;
    /// The tool's own error type; converted to a string for the folded
    /// transcript message.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Human-readable description shown to the model.
    fn description(&self) -> String;

    /// Side effects this tool's `execute` may perform.
    fn side_effects(&self) -> HashSet<SideEffect> {
        HashSet::new()
    }

    /// Per-call timeout, if any.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Routes this tool's dispatch through the sandbox executor instead
    /// of in-process execution, when present.
    fn sandbox(&self) -> Option<SandboxDescriptor> {
        None
    }

    /// Run the tool against validated arguments.
    async fn call(&self, args: Self::Args, ctx: &ToolContext) -> Result<Self::Output, Self::Error>;

    /// Project this tool's static shape into a [`ToolDefinition`].
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: self.description(),
            parameters: serde_json::to_value(schemars::schema_for!(Self::Args))
                .unwrap_or_else(|_| serde_json::json!({"type": "object"})),
            side_effects: self.side_effects(),
            timeout: self.timeout(),
            sandbox: self.sandbox(),
        }
    }
}

/// Object-safe projection of [`Tool`] used by the registry and executor,
/// where argument types vary per tool and must be erased to [`Value`].
#[async_trait]
pub trait ToolDyn: Send + Sync {
    /// See [`Tool::NAME`].
    fn name(&self) -> &str;
    /// See [`Tool::definition`].
    fn definition(&self) -> ToolDefinition;
    /// Deserialize `args`, then [`Tool::call`]; a deserialize failure is
    /// reported as [`ToolError::InvalidArgs`] without invoking the tool.
    async fn call_dyn(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError>;
}

#[async_trait]
impl<T: Tool> ToolDyn for T {
    fn name(&self) -> &str {
        T::NAME
    }

    fn definition(&self) -> ToolDefinition {
        Tool::definition(self)
    }

    async fn call_dyn(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let typed: T::Args = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidArgs(e.to_string()))?;
        let output = self
            .call(typed, ctx)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        serde_json::to_value(output).map_err(|e| ToolError::ExecutionFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct EchoArgs {
        text: String,
    }

    #[derive(Debug, Serialize)]
    struct EchoOutput {
        echoed: String,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("echo failed")]
    struct EchoError;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        const NAME: &'static str = "echo";
        type Args = EchoArgs;
        type Output = EchoOutput;
        type Error = EchoError;

        fn description(&self) -> String {
            "Echoes the input text back".to_string()
        }

        async fn call(&self, args: Self::Args, _ctx: &ToolContext) -> Result<Self::Output, Self::Error> {
            Ok(EchoOutput { echoed: args.text })
        }
    }

    fn ctx() -> ToolContext {
        ToolContext {
            agent_id: "a1".into(),
            run_id: "run_1".into(),
            cancellation: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn blanket_impl_round_trips_through_json() {
        let tool = EchoTool;
        let dyn_tool: &dyn ToolDyn = &tool;
        let out = dyn_tool
            .call_dyn(serde_json::json!({"text": "hi"}), &ctx())
            .await
            .unwrap();
        assert_eq!(out["echoed"], "hi");
    }

    #[tokio::test]
    async fn invalid_args_never_reach_call() {
        let tool = EchoTool;
        let dyn_tool: &dyn ToolDyn = &tool;
        let err = dyn_tool
            .call_dyn(serde_json::json!({"wrong_field": 1}), &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs(_)));
    }

    #[test]
    fn definition_projects_name_and_schema() {
        let tool = EchoTool;
        let def = Tool::definition(&tool);
        assert_eq!(def.name, "echo");
        assert!(def.parameters["properties"]["text"].is_object());
    }
}
