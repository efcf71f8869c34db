//! The sandbox executor contract: command-style and module-style
//! dispatch for tools that declare a [`agentrun_types::tool::SandboxDescriptor`].

use agentrun_types::error::SandboxError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// A shell command descriptor built from a tool call's arguments.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// The command line to run.
    pub command: String,
    /// Working directory, if not the sandbox's default.
    pub cwd: Option<String>,
    /// Extra environment variables.
    pub env: HashMap<String, String>,
    /// Kill the process if it runs longer than this.
    pub timeout: Option<Duration>,
}

/// The outcome of a command-style sandbox dispatch.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Process exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    /// Whether the sandbox killed the process for exceeding its timeout.
    pub timed_out: bool,
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// The command line that was run, echoed for the transcript.
    pub command: String,
}

/// Runs tools that declare a sandbox descriptor outside the host
/// process. Implementations wrap whatever isolation technology a
/// deployment uses (containers, microVMs, a subprocess jail).
#[async_trait]
pub trait SandboxManager: Send + Sync {
    /// Run a shell command descriptor and capture its result.
    async fn run_command(&self, spec: CommandSpec) -> Result<CommandResult, SandboxError>;

    /// Pipe JSON-serialized arguments to a named module as standard
    /// input; the module's standard output is parsed as JSON if
    /// possible, otherwise returned as a JSON string.
    async fn run_module(&self, module: &str, input: Value) -> Result<Value, SandboxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoSandbox;

    #[async_trait]
    impl SandboxManager for EchoSandbox {
        async fn run_command(&self, spec: CommandSpec) -> Result<CommandResult, SandboxError> {
            Ok(CommandResult {
                stdout: format!("ran: {}", spec.command),
                stderr: String::new(),
                exit_code: Some(0),
                timed_out: false,
                duration: Duration::from_millis(1),
                command: spec.command,
            })
        }

        async fn run_module(&self, module: &str, input: Value) -> Result<Value, SandboxError> {
            if module == "unknown" {
                return Err(SandboxError::InvalidModule(module.to_string()));
            }
            Ok(input)
        }
    }

    #[tokio::test]
    async fn command_dispatch_echoes_command_line() {
        let sandbox = EchoSandbox;
        let result = sandbox
            .run_command(CommandSpec {
                command: "ls -la".to_string(),
                cwd: None,
                env: HashMap::new(),
                timeout: None,
            })
            .await
            .unwrap();
        assert_eq!(result.command, "ls -la");
        assert_eq!(result.exit_code, Some(0));
    }

    #[tokio::test]
    async fn unknown_module_is_rejected() {
        let sandbox = EchoSandbox;
        let err = sandbox.run_module("unknown", Value::Null).await.unwrap_err();
        assert!(matches!(err, SandboxError::InvalidModule(_)));
    }
}
