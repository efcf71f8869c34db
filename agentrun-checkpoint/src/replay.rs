//! Deterministic and live replay, forking, and trace comparison.

use agentrun_types::checkpoint::{Checkpoint, ForkType, ReplayResult, StepComparison};
use agentrun_types::duration::{now_millis, DurationMs};
use agentrun_types::error::RunError;
use agentrun_types::id::gen::checkpoint_id;
use agentrun_types::message::{Content, Message, Role, ToolCall};
use agentrun_types::run::{RunResult, RunUsage};
use agentrun_types::span::{Span, Trace};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;

/// Caller-supplied overlays applied before replaying a checkpoint's
/// transcript.
#[derive(Debug, Clone, Default)]
pub struct ReplayOverrides {
    /// Replaces the checkpoint's entire message list, if set.
    pub message_overrides: Option<Vec<Message>>,
    /// Replaces the folded content of tool messages, keyed by call id.
    pub tool_result_overrides: HashMap<String, Value>,
}

fn overlaid_transcript(checkpoint: &Checkpoint, overrides: &ReplayOverrides) -> Vec<Message> {
    let mut messages = overrides
        .message_overrides
        .clone()
        .unwrap_or_else(|| checkpoint.messages.clone());
    for (call_id, value) in &overrides.tool_result_overrides {
        if let Some(msg) = messages.iter_mut().find(|m| m.tool_call_id.as_deref() == Some(call_id.as_str())) {
            msg.content = Content::Text(value.to_string());
        }
    }
    messages
}

fn last_assistant_text(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content.as_text())
        .unwrap_or_default()
}

/// Rebuild a checkpoint's transcript and synthesize a result with zero
/// new work: no backend calls, usage zeroed except duration.
pub fn deterministic_replay(checkpoint: &Checkpoint, overrides: &ReplayOverrides) -> (RunResult, ReplayResult) {
    let start = now_millis();
    let messages = overlaid_transcript(checkpoint, overrides);
    let output = last_assistant_text(&messages);
    let end = now_millis();

    let run_result = RunResult {
        output,
        run_id: checkpoint.run_id.clone(),
        agent_id: checkpoint.agent_id.clone(),
        thread_id: String::new(),
        model_used: String::new(),
        usage: RunUsage {
            input_tokens: 0,
            output_tokens: 0,
            total_tokens: 0,
            cost: Decimal::ZERO,
            duration: DurationMs::from_millis(end.saturating_sub(start)),
        },
        tool_calls: checkpoint.pending_tool_calls.clone(),
        messages,
        trace: Trace { trace_id: checkpoint.trace_id.clone(), spans: Vec::new() },
    };

    let replay = ReplayResult {
        replayed_from: checkpoint.id.clone(),
        original_trace_id: checkpoint.trace_id.clone(),
        steps_replayed: checkpoint.step_index + 1,
        steps_executed: 0,
        diverged_at: None,
    };

    (run_result, replay)
}

/// Runs an agent against a rebuilt transcript, the way the run
/// orchestrator would for a fresh run. Implemented by `agentrun-core` to
/// avoid a dependency cycle between replay and the orchestrator.
#[async_trait]
pub trait RunFromTranscript: Send + Sync {
    /// Run `agent_id` from a caller-supplied transcript instead of
    /// building one from scratch.
    async fn run_from_transcript(&self, agent_id: &str, messages: Vec<Message>) -> Result<RunResult, RunError>;
}

fn diverged_at(original: &[ToolCall], replayed: &[ToolCall]) -> Option<u32> {
    for (i, (a, b)) in original.iter().zip(replayed.iter()).enumerate() {
        if a.name != b.name || a.arguments != b.arguments {
            return Some(i as u32);
        }
    }
    if original.len() != replayed.len() {
        return Some(original.len().min(replayed.len()) as u32);
    }
    None
}

/// Rebuild a run-ready transcript and run the agent against it, detecting
/// divergence between the checkpoint's pending tool calls and the new
/// run's.
pub async fn live_replay(
    checkpoint: &Checkpoint,
    overrides: &ReplayOverrides,
    runner: &dyn RunFromTranscript,
) -> Result<(RunResult, ReplayResult), RunError> {
    let messages = overlaid_transcript(checkpoint, overrides);
    let result = runner.run_from_transcript(&checkpoint.agent_id, messages).await?;

    let replay = ReplayResult {
        replayed_from: checkpoint.id.clone(),
        original_trace_id: checkpoint.trace_id.clone(),
        steps_replayed: checkpoint.step_index + 1,
        steps_executed: 1,
        diverged_at: diverged_at(&checkpoint.pending_tool_calls, &result.tool_calls),
    };

    Ok((result, replay))
}

/// How a fork should modify the checkpoint it derives from.
#[derive(Debug, Clone, Default)]
pub struct ForkOptions {
    /// Additional text appended to the system message.
    pub extra_system_context: Option<String>,
    /// Replacement content for the last user message.
    pub replace_last_user_message: Option<Content>,
    /// Tool-result overrides pre-filled into the forked checkpoint.
    pub tool_result_overrides: HashMap<String, Value>,
}

fn classify_fork(options: &ForkOptions) -> ForkType {
    if !options.tool_result_overrides.is_empty() {
        ForkType::Mocked
    } else if options.replace_last_user_message.is_some() {
        ForkType::Input
    } else if options.extra_system_context.is_some() {
        ForkType::Context
    } else {
        ForkType::Plain
    }
}

/// Derive a new checkpoint from an existing one, recording
/// `forked_from`/`fork_type` in its metadata.
pub fn fork(checkpoint: &Checkpoint, options: ForkOptions) -> Checkpoint {
    let fork_type = classify_fork(&options);
    let mut messages = checkpoint.messages.clone();

    if let Some(extra) = &options.extra_system_context {
        if let Some(system) = messages.iter_mut().find(|m| m.role == Role::System) {
            let text = format!("{}\n\n{extra}", system.content.as_text());
            system.content = Content::Text(text);
        }
    }

    if let Some(replacement) = options.replace_last_user_message.clone() {
        if let Some(last_user) = messages.iter_mut().rev().find(|m| m.role == Role::User) {
            last_user.content = replacement;
        }
    }

    let mut tool_results = checkpoint.tool_results.clone();
    for (call_id, value) in options.tool_result_overrides {
        tool_results.insert(call_id, value);
    }

    let mut metadata = checkpoint.metadata.clone();
    metadata.insert("forked_from".to_string(), Value::String(checkpoint.id.clone()));
    metadata.insert(
        "fork_type".to_string(),
        serde_json::to_value(fork_type).unwrap_or(Value::Null),
    );

    Checkpoint {
        id: checkpoint_id().to_string(),
        trace_id: checkpoint.trace_id.clone(),
        run_id: checkpoint.run_id.clone(),
        agent_id: checkpoint.agent_id.clone(),
        step_index: checkpoint.step_index,
        messages,
        tool_results,
        pending_tool_calls: checkpoint.pending_tool_calls.clone(),
        label: checkpoint.label.clone(),
        created_at: now_millis(),
        metadata,
    }
}

/// Fork a checkpoint and immediately live-replay from it.
pub async fn fork_and_replay(
    checkpoint: &Checkpoint,
    fork_options: ForkOptions,
    runner: &dyn RunFromTranscript,
) -> Result<(Checkpoint, RunResult, ReplayResult), RunError> {
    let forked = fork(checkpoint, fork_options);
    let (result, replay) = live_replay(&forked, &ReplayOverrides::default(), runner).await?;
    Ok((forked, result, replay))
}

fn compare_spans(a: &Span, b: &Span) -> StepComparison {
    if a == b {
        return StepComparison::Identical;
    }
    let same_identity = a.name == b.name && a.attributes.get("tool.name") == b.attributes.get("tool.name");
    if !same_identity || a.status != b.status {
        return StepComparison::Different;
    }
    if a.name.starts_with("tool.") {
        let errors_match = a.attributes.get("tool.is_error") == b.attributes.get("tool.is_error");
        let args_match = a.attributes.get("tool.arguments") == b.attributes.get("tool.arguments");
        if errors_match && args_match {
            StepComparison::Similar
        } else {
            StepComparison::Different
        }
    } else {
        StepComparison::Similar
    }
}

/// Compare two finished traces step by step, for diagnostics only.
pub fn compare_traces(a: &Trace, b: &Trace) -> Vec<StepComparison> {
    let max_len = a.spans.len().max(b.spans.len());
    (0..max_len)
        .map(|i| match (a.spans.get(i), b.spans.get(i)) {
            (Some(x), Some(y)) => compare_spans(x, y),
            (Some(_), None) => StepComparison::OnlyIn1,
            (None, Some(_)) => StepComparison::OnlyIn2,
            (None, None) => unreachable!("index bounded by max_len"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentrun_types::span::{SpanKind, SpanStatus};
    use std::collections::HashMap as StdHashMap;

    fn checkpoint() -> Checkpoint {
        Checkpoint {
            id: "ckpt_1".into(),
            trace_id: "trace_1".into(),
            run_id: "run_1".into(),
            agent_id: "agent_1".into(),
            step_index: 2,
            messages: vec![
                Message::system("be helpful"),
                Message::user("hi"),
                Message::assistant("hello there"),
            ],
            tool_results: StdHashMap::new(),
            pending_tool_calls: vec![],
            label: None,
            created_at: 0,
            metadata: StdHashMap::new(),
        }
    }

    #[test]
    fn deterministic_replay_does_zero_new_work() {
        let ckpt = checkpoint();
        let (result, replay) = deterministic_replay(&ckpt, &ReplayOverrides::default());
        assert_eq!(result.output, "hello there");
        assert_eq!(result.usage.input_tokens, 0);
        assert_eq!(replay.steps_replayed, 3);
        assert_eq!(replay.steps_executed, 0);
        assert!(replay.diverged_at.is_none());
    }

    #[test]
    fn deterministic_replay_honors_message_overrides() {
        let ckpt = checkpoint();
        let overrides = ReplayOverrides {
            message_overrides: Some(vec![Message::system("x"), Message::user("y"), Message::assistant("overridden")]),
            tool_result_overrides: HashMap::new(),
        };
        let (result, _) = deterministic_replay(&ckpt, &overrides);
        assert_eq!(result.output, "overridden");
    }

    #[test]
    fn fork_with_no_options_is_plain() {
        let ckpt = checkpoint();
        let forked = fork(&ckpt, ForkOptions::default());
        assert_eq!(forked.metadata["fork_type"], serde_json::json!("plain"));
        assert_ne!(forked.id, ckpt.id);
    }

    #[test]
    fn fork_with_tool_overrides_is_mocked() {
        let ckpt = checkpoint();
        let mut overrides = HashMap::new();
        overrides.insert("call_1".to_string(), serde_json::json!({"ok": true}));
        let forked = fork(&ckpt, ForkOptions { tool_result_overrides: overrides, ..Default::default() });
        assert_eq!(forked.metadata["fork_type"], serde_json::json!("mocked"));
        assert_eq!(forked.tool_results["call_1"], serde_json::json!({"ok": true}));
    }

    #[test]
    fn fork_replacing_last_user_message_is_input_type() {
        let ckpt = checkpoint();
        let forked = fork(
            &ckpt,
            ForkOptions { replace_last_user_message: Some(Content::text("different question")), ..Default::default() },
        );
        assert_eq!(forked.metadata["fork_type"], serde_json::json!("input"));
        assert_eq!(forked.messages[1].content.as_text(), "different question");
    }

    #[test]
    fn diverged_at_flags_first_mismatched_call() {
        let original = vec![
            ToolCall { id: "c1".into(), name: "search".into(), arguments: serde_json::json!({"q": 1}) },
            ToolCall { id: "c2".into(), name: "read".into(), arguments: serde_json::json!({}) },
        ];
        let replayed = vec![
            ToolCall { id: "c1".into(), name: "search".into(), arguments: serde_json::json!({"q": 1}) },
            ToolCall { id: "c2".into(), name: "write".into(), arguments: serde_json::json!({}) },
        ];
        assert_eq!(diverged_at(&original, &replayed), Some(1));
    }

    #[test]
    fn diverged_at_flags_length_mismatch_after_common_prefix() {
        let original = vec![ToolCall { id: "c1".into(), name: "search".into(), arguments: serde_json::json!({}) }];
        let replayed = vec![];
        assert_eq!(diverged_at(&original, &replayed), Some(0));
    }

    fn span(name: &str, status: SpanStatus) -> Span {
        Span {
            id: "span_1".into(),
            trace_id: "trace_1".into(),
            parent_id: None,
            name: name.to_string(),
            start_time: 0,
            end_time: 1,
            attributes: HashMap::new(),
            status,
            kind: SpanKind::Internal,
        }
    }

    #[test]
    fn compare_traces_flags_only_in_one_side() {
        let a = Trace { trace_id: "t1".into(), spans: vec![span("agent.run", SpanStatus::Ok), span("llm.chat", SpanStatus::Ok)] };
        let b = Trace { trace_id: "t2".into(), spans: vec![span("agent.run", SpanStatus::Ok)] };
        let comparison = compare_traces(&a, &b);
        assert_eq!(comparison, vec![StepComparison::Identical, StepComparison::OnlyIn1]);
    }

    #[test]
    fn compare_traces_flags_different_status_as_different() {
        let a = Trace { trace_id: "t1".into(), spans: vec![span("tool.search", SpanStatus::Ok)] };
        let b = Trace { trace_id: "t2".into(), spans: vec![span("tool.search", SpanStatus::Error)] };
        assert_eq!(compare_traces(&a, &b), vec![StepComparison::Different]);
    }
}
