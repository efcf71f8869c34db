//! Process-wide configuration: pricing, budget ceilings, and feature
//! toggles that apply across runs unless a [`crate::agent::RunOptions`]
//! override wins.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;

/// Per-million-token pricing for one model.
#[derive(Debug, Clone, Copy)]
pub struct ModelPrice {
    /// Price per million input tokens.
    pub price_in: Decimal,
    /// Price per million output tokens.
    pub price_out: Decimal,
}

/// Spend ceilings enforced by the cost router's ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetCeilings {
    /// Maximum projected cost for a single run.
    pub per_run: Option<Decimal>,
    /// Maximum cumulative spend per rolling hour.
    pub per_hour: Option<Decimal>,
    /// Maximum cumulative spend per rolling day.
    pub per_day: Option<Decimal>,
}

/// Feature toggles applied process-wide, overridable per run where the
/// external interface names a corresponding `RunOptions` field.
#[derive(Debug, Clone, Copy)]
pub struct FeatureToggles {
    /// Whether a memory adapter is attached at all.
    pub memory_enabled: bool,
    /// Whether guardrail input/output/tool filters run.
    pub guardrails_enabled: bool,
    /// Whether prompt-injection classification runs before the first
    /// iteration.
    pub injection_detection_enabled: bool,
    /// Whether the cost router estimates/enforces/records spend.
    pub cost_routing_enabled: bool,
    /// Whether `autoSelectModel` is honored when cost routing is enabled.
    pub auto_select_model: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            memory_enabled: true,
            guardrails_enabled: false,
            injection_detection_enabled: false,
            cost_routing_enabled: false,
            auto_select_model: false,
        }
    }
}

/// Capability and scoring inputs for one routable model, registered by
/// the caller rather than hardcoded so new models/prices need no code
/// change.
#[derive(Debug, Clone)]
pub struct ModelCandidate {
    /// `provider/model` identifier.
    pub model: String,
    /// Pricing, if known; unpriced candidates still route but never win
    /// a cost-sensitive ranking.
    pub price: Option<ModelPrice>,
    /// Whether the model accepts image content parts.
    pub supports_vision: bool,
    /// Whether the model accepts a tool/function list.
    pub supports_tools: bool,
    /// Maximum context length, in tokens.
    pub context_window: u32,
    /// Coarse reasoning strength, `0..=2` (basic/standard/advanced).
    pub reasoning_level: u8,
    /// Typical end-to-end latency, used as a ranking penalty.
    pub avg_latency_ms: u64,
    /// Whether this model runs on caller-owned hardware rather than a
    /// billed remote API.
    pub is_local: bool,
}

/// Process-wide configuration shared by every run against one
/// orchestrator instance.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// `provider/model` → pricing.
    pub pricing: HashMap<String, ModelPrice>,
    /// Default spend ceilings.
    pub budget: BudgetCeilings,
    /// Default feature toggles.
    pub features: FeatureToggles,
    /// Default provider to fall back to when a model string carries no
    /// recognizable prefix and the agent names none explicitly.
    pub default_provider: String,
    /// How many most-recent memory entries to splice into a fresh prompt
    /// when no context builder is configured.
    pub default_history_limit: usize,
    /// Default per-run timeout when an agent does not specify one.
    pub default_timeout: Duration,
    /// Candidate models the router may pick among. Empty unless the
    /// caller registers candidates via [`Self::with_model`].
    pub models: Vec<ModelCandidate>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            pricing: HashMap::new(),
            budget: BudgetCeilings::default(),
            features: FeatureToggles::default(),
            default_provider: "ollama".to_string(),
            default_history_limit: 20,
            default_timeout: Duration::from_millis(120_000),
            models: Vec::new(),
        }
    }
}

impl OrchestratorConfig {
    /// Register or replace pricing for a `provider/model` string.
    pub fn with_price(mut self, model: impl Into<String>, price_in: Decimal, price_out: Decimal) -> Self {
        self.pricing.insert(model.into(), ModelPrice { price_in, price_out });
        self
    }

    /// Look up pricing for a model, if known.
    pub fn price_for(&self, model: &str) -> Option<ModelPrice> {
        self.pricing.get(model).copied()
    }

    /// Register a routable model candidate.
    pub fn with_model(mut self, candidate: ModelCandidate) -> Self {
        self.models.retain(|m| m.model != candidate.model);
        self.models.push(candidate);
        self
    }
}
