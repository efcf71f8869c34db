//! The run orchestrator façade: the iteration-bounded, cancellable,
//! observable control loop tying every other crate together.

use crate::cancellation::RunTrigger;
use crate::guardrail::{GuardrailEngine, InjectionVerdict, InputVerdict, OutputVerdict};
use crate::reflection::{NoopReflection, ReflectionEngine, ToolReflectionRecord};
use agentrun_checkpoint::CheckpointStore;
use agentrun_context::MessageBuilder;
use agentrun_cost::{estimate_cost, route, EstimateOptions, RouteRequest};
use agentrun_exec::{GuardrailPipeline, SandboxManager, ToolExecutor};
use agentrun_tool::ToolRegistry;
use agentrun_trace::SpanRecorder;
use agentrun_types::agent::{Agent, RunOptions};
use agentrun_types::checkpoint::Checkpoint;
use agentrun_types::config::OrchestratorConfig;
use agentrun_types::duration::{now_millis, DurationMs};
use agentrun_types::error::{AgentError, Cancelled, GenericError, PolicyError, RunError};
use agentrun_context::ContextStrategy;
use agentrun_types::id::gen as id_gen;
use agentrun_types::message::{Content, Message};
use agentrun_types::provider::{CompletionRequest, FinishReason, Provider};
use agentrun_types::run::{RunResult, RunUsage};
use agentrun_types::span::{Span, SpanKind, SpanStatus, Trace};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;

/// Bound on how many prior-run insights are kept per agent and spliced
/// into a later run's system message.
const MAX_INSIGHTS_PER_AGENT: usize = 5;

#[derive(Default)]
struct RunAccumulator {
    effective_model: String,
    input_tokens: u64,
    output_tokens: u64,
    iterations: u32,
    tool_calls: Vec<agentrun_types::message::ToolCall>,
    messages: Vec<Message>,
}

/// Ties the tool registry, span recorder, message builder, tool
/// executor, checkpoint store, cost router, and guardrail engine into
/// one run loop. One instance is normally shared across many
/// concurrent runs; each run owns its own transcript, ids, span list,
/// and cancellation trigger (per the concurrency model).
pub struct Orchestrator {
    config: OrchestratorConfig,
    tools: ToolRegistry,
    message_builder: MessageBuilder,
    tool_executor: ToolExecutor,
    tool_guardrails: GuardrailPipeline,
    guardrails: GuardrailEngine,
    sandbox: Option<Arc<dyn SandboxManager>>,
    checkpoint_store: Option<Arc<dyn CheckpointStore>>,
    reflection: Arc<dyn ReflectionEngine>,
    providers: HashMap<String, Arc<dyn Provider>>,
    cost_ledger: agentrun_cost::SpendLedger,
    insights: RwLock<HashMap<String, Vec<String>>>,
    reflection_summaries: RwLock<HashMap<String, String>>,
}

/// Builds an [`Orchestrator`] from its optional collaborators.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    tools: ToolRegistry,
    message_builder: MessageBuilder,
    tool_guardrails: GuardrailPipeline,
    guardrails: GuardrailEngine,
    sandbox: Option<Arc<dyn SandboxManager>>,
    checkpoint_store: Option<Arc<dyn CheckpointStore>>,
    reflection: Arc<dyn ReflectionEngine>,
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl OrchestratorBuilder {
    /// Start from process-wide configuration.
    pub fn new(config: OrchestratorConfig) -> Self {
        let history_limit = config.default_history_limit;
        Self {
            config,
            tools: ToolRegistry::new(),
            message_builder: MessageBuilder::new(history_limit),
            tool_guardrails: GuardrailPipeline::new(),
            guardrails: GuardrailEngine::new(),
            sandbox: None,
            checkpoint_store: None,
            reflection: Arc::new(NoopReflection),
            providers: HashMap::new(),
        }
    }

    /// Register a tool, available to any agent that names it.
    pub fn tool(mut self, tool: Arc<dyn agentrun_types::tool::ToolDyn>) -> Self {
        self.tools.register(tool);
        self
    }

    /// Register a backend under its provider tag.
    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.insert(provider.provider_tag().to_string(), provider);
        self
    }

    /// Attach a memory adapter.
    pub fn memory(mut self, memory: Arc<dyn agentrun_context::MemoryAdapter>) -> Self {
        self.message_builder = self.message_builder.with_memory(memory);
        self
    }

    /// Attach a context compaction strategy.
    pub fn context_strategy(mut self, strategy: Arc<dyn agentrun_context::ContextStrategy>) -> Self {
        self.message_builder = self.message_builder.with_context_strategy(strategy);
        self
    }

    /// Attach a tool-approval guardrail to the executor's pipeline.
    pub fn tool_guardrail(mut self, guardrail: Arc<dyn agentrun_exec::ToolGuardrail>) -> Self {
        self.tool_guardrails.add(guardrail);
        self
    }

    /// Attach the input/output/injection guardrail engine.
    pub fn guardrails(mut self, guardrails: GuardrailEngine) -> Self {
        self.guardrails = guardrails;
        self
    }

    /// Attach a sandbox manager for tools carrying a sandbox descriptor.
    pub fn sandbox(mut self, sandbox: Arc<dyn SandboxManager>) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    /// Attach a checkpoint store; when set, each iteration is
    /// checkpointed.
    pub fn checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint_store = Some(store);
        self
    }

    /// Attach a reflection engine.
    pub fn reflection(mut self, reflection: Arc<dyn ReflectionEngine>) -> Self {
        self.reflection = reflection;
        self
    }

    /// Finish building.
    pub fn build(self) -> Orchestrator {
        let filter_enabled = self.config.features.guardrails_enabled;
        Orchestrator {
            config: self.config,
            tools: self.tools,
            message_builder: self.message_builder,
            tool_executor: ToolExecutor::new(filter_enabled),
            tool_guardrails: self.tool_guardrails,
            guardrails: self.guardrails,
            sandbox: self.sandbox,
            checkpoint_store: self.checkpoint_store,
            reflection: self.reflection,
            providers: self.providers,
            cost_ledger: agentrun_cost::SpendLedger::new(),
            insights: RwLock::new(HashMap::new()),
            reflection_summaries: RwLock::new(HashMap::new()),
        }
    }
}

fn provider_tag_for(agent: &Agent, model: &str, default_provider: &str) -> String {
    if let Some(p) = &agent.provider {
        return p.clone();
    }
    match model.split_once('/') {
        Some((tag, _)) => tag.to_string(),
        None => default_provider.to_string(),
    }
}

fn model_name_for(model: &str) -> &str {
    model.split_once('/').map(|(_, rest)| rest).unwrap_or(model)
}

impl Orchestrator {
    /// Start building an orchestrator.
    pub fn builder(config: OrchestratorConfig) -> OrchestratorBuilder {
        OrchestratorBuilder::new(config)
    }

    fn snapshot_tools(&self, agent: &Agent) -> ToolRegistry {
        let mut snapshot = ToolRegistry::new();
        for def in &agent.tools {
            if let Some(tool) = self.tools.get(&def.name) {
                snapshot.register(tool.clone());
            }
        }
        snapshot
    }

    fn resolve_backend(&self, provider_tag: &str) -> Result<Arc<dyn Provider>, RunError> {
        self.providers
            .get(provider_tag)
            .cloned()
            .ok_or_else(|| RunError::Generic(GenericError::Configuration(format!("no backend registered for provider '{provider_tag}'"))))
    }

    /// Ahead-of-run cost estimation; makes no backend call.
    pub fn estimate_cost(&self, agent: &Agent, input: &str) -> agentrun_cost::CostEstimate {
        estimate_cost(agent, input, &self.config, &EstimateOptions::default())
    }

    /// Insights recorded from prior runs' reflections, if any.
    pub fn get_insights(&self, agent_id: &str) -> Vec<String> {
        self.insights.read().expect("insights lock poisoned").get(agent_id).cloned().unwrap_or_default()
    }

    /// The most recent end-of-run reflection summary, if any.
    pub fn get_reflection_summary(&self, agent_id: &str) -> Option<String> {
        self.reflection_summaries.read().expect("summaries lock poisoned").get(agent_id).cloned()
    }

    /// Cumulative spend recorded by completed runs.
    pub fn get_cost_summary(&self) -> agentrun_cost::CostSummary {
        self.cost_ledger.summary()
    }

    /// Disconnect memory, shut down the sandbox, drop the backend
    /// cache. Idempotent: this orchestrator is simply dropped, which is
    /// itself idempotent in Rust.
    pub fn close(&self) {
        tracing::info!("orchestrator closed");
    }

    fn resolve_effective_model(&self, agent: &Agent, input: &str) -> Result<String, RunError> {
        if !(self.config.features.cost_routing_enabled && self.config.features.auto_select_model) {
            return Ok(agent.model.clone());
        }
        let (_, hints) = agentrun_cost::analyze(input, !agent.tools.is_empty());
        let request = RouteRequest::from_hints(&hints, 0);
        Ok(route(&self.config, &request).unwrap_or_else(|| agent.model.clone()))
    }

    /// Run `agent` against `options` to completion or failure.
    pub async fn run(&self, agent: &Agent, options: RunOptions) -> Result<RunResult, RunError> {
        self.run_with_cancellation(agent, options, None).await
    }

    /// Run `agent`, composing the internal timeout trigger with a
    /// caller-supplied cancellation token (earliest wins).
    pub async fn run_with_cancellation(
        &self,
        agent: &Agent,
        options: RunOptions,
        external_cancellation: Option<CancellationToken>,
    ) -> Result<RunResult, RunError> {
        let run_id = id_gen::run_id();
        let trace_id = id_gen::trace_id();
        let thread_id = options.thread_id.clone().unwrap_or_else(|| id_gen::thread_id().to_string());
        let timeout = options.timeout.unwrap_or(agent.timeout);
        let start = now_millis();

        let trigger = RunTrigger::install(timeout, external_cancellation);
        let recorder = match &options.on_span {
            Some(observer) => SpanRecorder::with_observer(trace_id.to_string(), observer.clone()),
            None => SpanRecorder::new(trace_id.to_string()),
        };

        if let Some(cb) = &options.on_run_start {
            cb(run_id.as_str());
        }

        let mut acc = RunAccumulator::default();
        let outcome = self
            .run_inner(agent, &options, run_id.as_str(), &thread_id, &recorder, &trigger, &mut acc)
            .await;
        let end = now_millis();
        trigger.stop();

        let status = if outcome.is_ok() { SpanStatus::Ok } else { SpanStatus::Error };
        let mut root_attrs = HashMap::new();
        root_attrs.insert("run_id".to_string(), serde_json::json!(run_id.as_str()));
        root_attrs.insert("agent_id".to_string(), serde_json::json!(agent.id));
        root_attrs.insert("thread_id".to_string(), serde_json::json!(thread_id));
        root_attrs.insert("model_used".to_string(), serde_json::json!(acc.effective_model));
        root_attrs.insert("iterations".to_string(), serde_json::json!(acc.iterations));
        root_attrs.insert("input_tokens".to_string(), serde_json::json!(acc.input_tokens));
        root_attrs.insert("output_tokens".to_string(), serde_json::json!(acc.output_tokens));

        let root_span = Span {
            id: id_gen::span_id().to_string(),
            trace_id: trace_id.to_string(),
            parent_id: None,
            name: "agent.run".to_string(),
            start_time: start,
            end_time: end,
            attributes: root_attrs,
            status,
            kind: SpanKind::Internal,
        };
        if let Some(cb) = &options.on_span {
            cb(&root_span);
        }
        let mut spans = vec![root_span];
        spans.extend(recorder.trace().spans);
        let trace = Trace { trace_id: trace_id.to_string(), spans };

        match outcome {
            Ok(output) => {
                let total_tokens = acc.input_tokens + acc.output_tokens;
                let cost = self
                    .config
                    .price_for(&acc.effective_model)
                    .map(|price| {
                        (Decimal::from(acc.input_tokens) * price.price_in
                            + Decimal::from(acc.output_tokens) * price.price_out)
                            / Decimal::new(1_000_000, 0)
                    })
                    .unwrap_or(Decimal::ZERO);
                let result = RunResult {
                    output,
                    run_id: run_id.to_string(),
                    agent_id: agent.id.clone(),
                    thread_id,
                    model_used: acc.effective_model,
                    usage: RunUsage {
                        input_tokens: acc.input_tokens,
                        output_tokens: acc.output_tokens,
                        total_tokens,
                        cost,
                        duration: DurationMs::from_millis(end.saturating_sub(start)),
                    },
                    tool_calls: acc.tool_calls,
                    messages: acc.messages,
                    trace,
                };
                if self.config.features.cost_routing_enabled {
                    self.cost_ledger.record_cost(result.usage.cost);
                }
                if let Some(summary) = self.reflection.summarize(&result).await.unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "end-of-run reflection failed, skipping summary");
                    None
                }) {
                    self.reflection_summaries
                        .write()
                        .expect("summaries lock poisoned")
                        .insert(agent.id.clone(), summary.clone());
                    let mut insights = self.insights.write().expect("insights lock poisoned");
                    let entry = insights.entry(agent.id.clone()).or_default();
                    entry.push(summary);
                    if entry.len() > MAX_INSIGHTS_PER_AGENT {
                        entry.remove(0);
                    }
                }
                if let Some(cb) = &options.on_run_complete {
                    cb(&result);
                }
                Ok(result)
            }
            Err(err) => {
                tracing::error!(run_id = run_id.as_str(), error = %err, "run failed");
                if let Some(cb) = &options.on_run_error {
                    cb(&err, run_id.as_str());
                }
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_inner(
        &self,
        agent: &Agent,
        options: &RunOptions,
        run_id: &str,
        thread_id: &str,
        recorder: &SpanRecorder,
        trigger: &RunTrigger,
        acc: &mut RunAccumulator,
    ) -> Result<String, RunError> {
        let tools = self.snapshot_tools(agent);

        let effective_model = self.resolve_effective_model(agent, &options.input)?;
        if self.config.features.cost_routing_enabled {
            let estimate = estimate_cost(agent, &options.input, &self.config, &EstimateOptions::default());
            self.cost_ledger
                .check_budget(estimate.expected_cost, &self.config.budget)
                .map_err(|e| RunError::Agent(e))?;
        }
        acc.effective_model = effective_model.clone();

        let provider_tag = provider_tag_for(agent, &effective_model, &self.config.default_provider);
        let backend = self.resolve_backend(&provider_tag)?;

        let mut messages = self.message_builder.build_initial(agent, options, thread_id).await;
        let insights = self.get_insights(&agent.id);
        self.message_builder.enrich_messages_with_insights(&mut messages, &insights);

        if self.config.features.injection_detection_enabled
            && self.guardrails.classify(&options.input).await == InjectionVerdict::Blocked
        {
            return Err(RunError::Policy(PolicyError::PromptInjectionDetected));
        }

        if self.config.features.guardrails_enabled {
            if let InputVerdict::Blocked(reason) = self.guardrails.filter_input(&options.input).await {
                return Err(RunError::Policy(PolicyError::InputBlocked(reason)));
            }
        }

        if !options.context.is_empty() {
            self.message_builder.add_context_to_messages(&mut messages, &options.context);
        }

        if options.use_memory && options.save_history {
            if let Some(user_message) = messages.last().cloned() {
                self.save_entry(thread_id, user_message, options).await;
            }
        }

        let model_name = model_name_for(&effective_model).to_string();

        for _ in 0..agent.max_iterations {
            if trigger.token.is_cancelled() {
                return Err(RunError::Cancelled(Cancelled { reason: trigger.reason() }));
            }

            if let Some(strategy) = self.message_builder.context_strategy() {
                let limit = self.message_builder.history_limit().max(1) * 4;
                if strategy.should_compact(&messages, limit) {
                    messages = strategy.compact(std::mem::take(&mut messages));
                }
            }

            acc.iterations += 1;
            let iteration = acc.iterations;

            let request = CompletionRequest {
                model: model_name.clone(),
                messages: messages.clone(),
                tools: tools.get_schemas(),
                tool_choice: None,
                temperature: Some(agent.temperature),
                top_p: agent.top_p,
                max_tokens: agent.max_tokens,
                stop: agent.stop_sequences.clone(),
                response_format: None,
            };

            let llm_start = now_millis();
            let response = if options.stream && options.on_token.is_some() {
                let handle = tokio::select! {
                    result = backend.chat_stream(request) => result?,
                    _ = trigger.token.cancelled() => {
                        return Err(RunError::Cancelled(Cancelled { reason: trigger.reason() }));
                    }
                };
                let on_token = options.on_token.clone();
                let cb: Box<dyn Fn(&str) + Send + Sync> = Box::new(move |tok: &str| {
                    if let Some(cb) = &on_token {
                        cb(tok);
                    }
                });
                tokio::select! {
                    result = agentrun_exec::read_stream(handle, Some(cb.as_ref()), &messages) => {
                        result.map_err(|e| RunError::Llm(agentrun_types::error::LlmError::InvalidResponse(e.to_string())))?
                    }
                    _ = trigger.token.cancelled() => {
                        return Err(RunError::Cancelled(Cancelled { reason: trigger.reason() }));
                    }
                }
            } else {
                tokio::select! {
                    result = backend.chat(request) => result?,
                    _ = trigger.token.cancelled() => {
                        return Err(RunError::Cancelled(Cancelled { reason: trigger.reason() }));
                    }
                }
            };
            let llm_end = now_millis();

            acc.input_tokens += response.usage.input_tokens;
            acc.output_tokens += response.usage.output_tokens;

            let mut attrs = HashMap::new();
            attrs.insert("llm.model".to_string(), serde_json::json!(effective_model));
            attrs.insert("llm.iteration".to_string(), serde_json::json!(iteration));
            attrs.insert("llm.input_tokens".to_string(), serde_json::json!(response.usage.input_tokens));
            attrs.insert("llm.output_tokens".to_string(), serde_json::json!(response.usage.output_tokens));
            attrs.insert("llm.finish_reason".to_string(), serde_json::json!(format!("{:?}", response.finish_reason)));
            // The recorder's observer (wired from options.on_span above) already
            // forwards this span as it's built; tool spans recorded deeper inside
            // the executor reach it the same way.
            recorder.record(
                "llm.chat".to_string(),
                None,
                llm_start,
                llm_end,
                attrs,
                if response.finish_reason == FinishReason::Error { SpanStatus::Error } else { SpanStatus::Ok },
                SpanKind::Client,
            );

            let mut content = response.content.clone();
            if self.config.features.guardrails_enabled {
                match self.guardrails.filter_output(&content, &messages).await {
                    OutputVerdict::Approved => {}
                    OutputVerdict::Revised(revised) => content = revised,
                    OutputVerdict::Blocked(reason) => return Err(RunError::Policy(PolicyError::OutputBlocked(reason))),
                }
            }

            let assistant_message = if response.tool_calls.is_empty() {
                Message::assistant(Content::text(content.clone()))
            } else {
                Message::assistant_with_tool_calls(Content::text(content.clone()), response.tool_calls.clone())
            };
            messages.push(assistant_message.clone());
            if options.save_history {
                self.save_entry(thread_id, assistant_message, options).await;
            }

            if response.finish_reason != FinishReason::ToolCalls {
                acc.messages = messages;
                return Ok(content);
            }

            if trigger.token.is_cancelled() {
                return Err(RunError::Cancelled(Cancelled { reason: trigger.reason() }));
            }

            let results = if options.parallel_tool_calls {
                let futures = response.tool_calls.iter().map(|call| {
                    let recorder = recorder;
                    async move {
                        self.dispatch_tool(agent, run_id, call, &tools, &trigger.token, recorder, options).await
                    }
                });
                futures::future::join_all(futures).await
            } else {
                let mut out = Vec::with_capacity(response.tool_calls.len());
                for call in &response.tool_calls {
                    out.push(self.dispatch_tool(agent, run_id, call, &tools, &trigger.token, recorder, options).await);
                }
                out
            };

            for (call, result) in response.tool_calls.iter().zip(results.into_iter()) {
                acc.tool_calls.push(call.clone());
                let tool_message = Message::tool_result(&result);
                messages.push(tool_message.clone());
                if options.save_history {
                    self.save_entry(thread_id, tool_message, options).await;
                }
                if let Some(cb) = &options.on_tool_result {
                    cb(&result);
                }

                let record = ToolReflectionRecord {
                    tool_call_id: result.call_id.clone(),
                    tool_name: result.name.clone(),
                    input: call.arguments.clone(),
                    output: result.result.clone(),
                    error: result.error.clone(),
                    duration_ms: 0,
                };
                match self.reflection.on_tool_call(&record).await {
                    Ok(Some(advisory)) => messages.push(Message::system(advisory)),
                    Ok(None) => {}
                    Err(err) => tracing::warn!(error = %err, "tool reflection failed, skipping advisory"),
                }
            }

            if let Some(store) = &self.checkpoint_store {
                self.save_checkpoint(store.as_ref(), run_id, &trace_id_for(recorder), agent, iteration, &messages, &response.tool_calls)
                    .await;
            }
        }

        acc.messages = messages;
        Err(RunError::Agent(AgentError::MaxIterations(agent.max_iterations)))
    }

    async fn dispatch_tool(
        &self,
        agent: &Agent,
        run_id: &str,
        call: &agentrun_types::message::ToolCall,
        tools: &ToolRegistry,
        cancellation: &CancellationToken,
        recorder: &SpanRecorder,
        options: &RunOptions,
    ) -> agentrun_types::message::ToolResult {
        if let Some(cb) = &options.on_tool_call {
            cb(call);
        }
        let guardrail = PipelineGuardrail(&self.tool_guardrails);
        self.tool_executor
            .execute(
                tools,
                call,
                run_id,
                &agent.id,
                self.sandbox.as_deref(),
                Some(&guardrail as &dyn agentrun_exec::ToolGuardrail),
                cancellation.clone(),
                Some((recorder, run_id)),
            )
            .await
    }

    async fn save_entry(&self, thread_id: &str, message: Message, options: &RunOptions) {
        let on_memory_error = options.on_memory_error.clone();
        let callback = on_memory_error.map(|cb| {
            let boxed: Box<dyn Fn(agentrun_types::error::MemoryError) + Send + Sync> = Box::new(move |err| cb(&err));
            boxed
        });
        self.message_builder.save_entry(thread_id, message, callback.as_deref()).await;
    }

    async fn save_checkpoint(
        &self,
        store: &dyn CheckpointStore,
        run_id: &str,
        trace_id: &str,
        agent: &Agent,
        step_index: u32,
        messages: &[Message],
        pending_tool_calls: &[agentrun_types::message::ToolCall],
    ) {
        let checkpoint = Checkpoint {
            id: id_gen::checkpoint_id().to_string(),
            trace_id: trace_id.to_string(),
            run_id: run_id.to_string(),
            agent_id: agent.id.clone(),
            step_index,
            messages: messages.to_vec(),
            tool_results: HashMap::new(),
            pending_tool_calls: pending_tool_calls.to_vec(),
            label: None,
            created_at: now_millis(),
            metadata: HashMap::new(),
        };
        if let Err(err) = store.save(checkpoint).await {
            tracing::warn!(error = %err, "failed to save checkpoint, continuing run");
        }
    }
}

fn trace_id_for(recorder: &SpanRecorder) -> String {
    recorder.trace().trace_id
}

/// Bridges the tool-approval pipeline to the borrowed-guardrail
/// parameter the executor expects.
struct PipelineGuardrail<'a>(&'a GuardrailPipeline);

#[async_trait::async_trait]
impl<'a> agentrun_exec::ToolGuardrail for PipelineGuardrail<'a> {
    async fn approve(&self, tool_name: &str, arguments: &serde_json::Value) -> agentrun_exec::GuardrailDecision {
        self.0.approve(tool_name, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_tag_prefers_explicit_override() {
        let agent = Agent::builder("a", "gpt-4o", "hi").provider("custom").build();
        assert_eq!(provider_tag_for(&agent, "gpt-4o", "ollama"), "custom");
    }

    #[test]
    fn provider_tag_falls_back_to_model_prefix() {
        let agent = Agent::builder("a", "openai/gpt-4o", "hi").build();
        assert_eq!(provider_tag_for(&agent, "openai/gpt-4o", "ollama"), "openai");
    }

    #[test]
    fn provider_tag_falls_back_to_default_when_no_prefix() {
        let agent = Agent::builder("a", "gpt-4o", "hi").build();
        assert_eq!(provider_tag_for(&agent, "gpt-4o", "ollama"), "ollama");
    }

    #[test]
    fn model_name_strips_provider_prefix() {
        assert_eq!(model_name_for("openai/gpt-4o"), "gpt-4o");
        assert_eq!(model_name_for("gpt-4o"), "gpt-4o");
    }
}
