//! Error taxonomy surfaced to orchestrator callers.
//!
//! One `thiserror`-derived enum per concern, each able to classify itself
//! as retryable. [`RunError`] is the top-level error the façade's `run`
//! and `estimate_cost` return.

use std::time::Duration;

/// Errors from the LLM backend.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Backend is unreachable or refusing connections.
    #[error("llm backend unavailable: {0}")]
    Unavailable(String),
    /// Rate limited by the backend.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested retry delay, if the backend provided one.
        retry_after: Option<Duration>,
    },
    /// The call did not complete before its deadline.
    #[error("llm call timed out after {0:?}")]
    Timeout(Duration),
    /// The backend's response could not be parsed into the expected shape.
    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),
    /// The composed messages exceed the model's context window.
    #[error("context length exceeded: {0}")]
    ContextLengthExceeded(String),
    /// The backend's own content filter rejected the request or reply.
    #[error("content filtered: {0}")]
    ContentFiltered(String),
}

impl LlmError {
    /// Whether retrying the same call is likely to succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::RateLimited { .. } | Self::Timeout(_)
        )
    }
}

/// Errors from the sandbox executor.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// No sandbox manager is available.
    #[error("sandbox unavailable: {0}")]
    Unavailable(String),
    /// The sandboxed execution did not finish before its deadline.
    #[error("sandbox execution timed out")]
    Timeout,
    /// The sandboxed process was killed for exceeding its memory limit.
    #[error("sandbox execution ran out of memory")]
    Oom,
    /// The sandboxed process ran but failed.
    #[error("sandbox execution failed: {0}")]
    ExecutionFailed(String),
    /// A module-style sandbox descriptor referenced an unknown module.
    #[error("invalid sandbox module: {0}")]
    InvalidModule(String),
}

impl SandboxError {
    /// Whether retrying is likely to succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout)
    }
}

/// Errors surfaced when dispatching a single tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// No tool is registered under this name.
    #[error("Tool not found: {0}")]
    NotFound(String),
    /// The arguments did not satisfy the tool's parameter schema.
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
    /// The tool ran but raised.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    /// The tool did not finish before its deadline.
    #[error("tool call timed out")]
    Timeout,
    /// A guardrail layer refused to approve this call.
    #[error("Tool blocked: {0}")]
    Blocked(String),
}

impl ToolError {
    /// Whether retrying the same call is likely to succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Errors from the memory adapter. Never fatal to a run — see the
/// propagation policy on [`RunError`].
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// The adapter is not connected or otherwise unavailable.
    #[error("memory adapter unavailable: {0}")]
    Unavailable(String),
    /// A write (thread creation or entry append) failed.
    #[error("memory write failed: {0}")]
    WriteFailed(String),
    /// A read (thread lookup or entry fetch) failed.
    #[error("memory read failed: {0}")]
    ReadFailed(String),
}

/// Errors about the run itself rather than any one collaborator.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The agent (keyed by thread) is already running a turn.
    #[error("agent is already running")]
    AlreadyRunning,
    /// The iteration bound was reached without a terminal reply.
    #[error("reached the maximum of {0} iterations")]
    MaxIterations(u32),
    /// A cost ceiling would be or was exceeded.
    #[error("Budget exceeded: {0}")]
    BudgetExceeded(String),
}

/// Errors from guardrail, injection-detection, or policy layers.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The injection detector classified the input as an attack.
    #[error("prompt injection detected")]
    PromptInjectionDetected,
    /// The input guardrail rejected the request.
    #[error("Input blocked: {0}")]
    InputBlocked(String),
    /// The output guardrail rejected the reply and offered no revision.
    #[error("Output blocked: {0}")]
    OutputBlocked(String),
    /// The tool-approval guardrail refused a call outright (surfaced at
    /// the run level only when the refusal itself cannot be folded back,
    /// e.g. during a §4.6 step 10 input-stage check).
    #[error("Tool blocked: {0}")]
    ToolBlocked(String),
}

/// Catch-all, infrastructure-level errors.
#[derive(Debug, thiserror::Error)]
pub enum GenericError {
    /// A value failed validation outside of a tool's own schema.
    #[error("validation error: {0}")]
    Validation(String),
    /// The orchestrator or one of its collaborators was misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// An invariant the implementation relies on was violated.
    #[error("internal error: {0}")]
    Internal(String),
    /// A circuit breaker is open and is short-circuiting calls.
    #[error("circuit open")]
    CircuitOpen,
}

/// The run was cancelled, either by the internal timeout trigger or by a
/// caller-supplied cancellation handle (earliest wins).
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct Cancelled {
    /// Why the run was cancelled, e.g. `"Run timed out after 120000ms"`.
    pub reason: String,
}

/// The top-level error returned by the orchestrator façade.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// See [`LlmError`].
    #[error(transparent)]
    Llm(#[from] LlmError),
    /// See [`SandboxError`].
    #[error(transparent)]
    Sandbox(#[from] SandboxError),
    /// See [`ToolError`]. Only escapes to this level when a tool error
    /// occurs outside normal dispatch (dispatch-time tool errors are
    /// folded into the transcript, never raised).
    #[error(transparent)]
    Tool(#[from] ToolError),
    /// See [`MemoryError`]. Only escapes here if surfaced by a caller
    /// explicitly inspecting adapter state; ordinary run-time memory
    /// errors are non-fatal per §7.
    #[error(transparent)]
    Memory(#[from] MemoryError),
    /// See [`AgentError`].
    #[error(transparent)]
    Agent(#[from] AgentError),
    /// See [`PolicyError`].
    #[error(transparent)]
    Policy(#[from] PolicyError),
    /// See [`GenericError`].
    #[error(transparent)]
    Generic(#[from] GenericError),
    /// See [`Cancelled`].
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl RunError {
    /// Whether the error matches a retryable message pattern or kind:
    /// `timeout | conn-refused | conn-reset | rate limit | 503 | 429`, or
    /// the underlying kind is inherently transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            RunError::Llm(e) => e.is_retryable(),
            RunError::Sandbox(e) => e.is_retryable(),
            RunError::Tool(e) => e.is_retryable(),
            RunError::Generic(GenericError::CircuitOpen) => true,
            _ => {
                let msg = self.to_string().to_lowercase();
                ["timeout", "conn-refused", "conn-reset", "rate limit", "503", "429"]
                    .iter()
                    .any(|pat| msg.contains(pat))
            }
        }
    }
}
