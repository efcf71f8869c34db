//! Ranks registered model candidates against a request's capability
//! gates and routing hints.

use crate::analyzer::{CostSensitivity, TaskHints};
use agentrun_types::config::{ModelCandidate, OrchestratorConfig};

/// What the caller needs from a routed model.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest {
    /// The request needs image input support.
    pub needs_vision: bool,
    /// The request needs function/tool-calling support.
    pub needs_tools: bool,
    /// The minimum context window the request requires.
    pub min_context_window: u32,
    /// Drawn from task analysis; shifts the cost/reasoning tradeoff.
    pub cost_sensitivity: CostSensitivity,
}

impl RouteRequest {
    /// Build a request from analyzer hints.
    pub fn from_hints(hints: &TaskHints, min_context_window: u32) -> Self {
        Self {
            needs_vision: hints.needs_vision,
            needs_tools: hints.needs_tools,
            min_context_window,
            cost_sensitivity: hints.cost_sensitivity,
        }
    }
}

fn passes_gates(candidate: &ModelCandidate, request: &RouteRequest) -> bool {
    (!request.needs_vision || candidate.supports_vision)
        && (!request.needs_tools || candidate.supports_tools)
        && candidate.context_window >= request.min_context_window
}

/// Score in `[0, 1]`: higher reasoning, lower latency, lower cost, and
/// locality (weighted by cost sensitivity) all push the score up.
fn score(candidate: &ModelCandidate, request: &RouteRequest) -> f64 {
    let reasoning_score = candidate.reasoning_level as f64 / 2.0;

    let latency_score = 1.0 - (candidate.avg_latency_ms as f64 / 10_000.0).min(1.0);

    let cost_score = match &candidate.price {
        None => 0.5,
        Some(p) => {
            let blended = (p.price_in + p.price_out) / rust_decimal::Decimal::new(2, 0);
            let blended = blended.to_string().parse::<f64>().unwrap_or(50.0);
            1.0 - (blended / 50.0).min(1.0)
        }
    };

    let locality_bonus = if candidate.is_local { 0.15 } else { 0.0 };

    let (w_reasoning, w_cost) = match request.cost_sensitivity {
        CostSensitivity::High => (0.2, 0.5),
        CostSensitivity::Medium => (0.35, 0.35),
        CostSensitivity::Low => (0.5, 0.2),
    };
    let w_latency = 1.0 - w_reasoning - w_cost;

    w_reasoning * reasoning_score + w_latency * latency_score + w_cost * cost_score + locality_bonus
}

/// Pick the best-scoring model among `config.models` that satisfies
/// `request`'s capability gates. Prefers a local candidate within 80% of
/// the top score, favoring zero marginal cost when quality is close.
pub fn route(config: &OrchestratorConfig, request: &RouteRequest) -> Option<String> {
    let mut scored: Vec<(&ModelCandidate, f64)> = config
        .models
        .iter()
        .filter(|c| passes_gates(c, request))
        .map(|c| (c, score(c, request)))
        .collect();

    if scored.is_empty() {
        return None;
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let top_score = scored[0].1;

    let local_within_threshold = scored
        .iter()
        .find(|(c, s)| c.is_local && *s >= top_score * 0.8);

    match local_within_threshold {
        Some((candidate, _)) => Some(candidate.model.clone()),
        None => Some(scored[0].0.model.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentrun_types::config::ModelPrice;
    use rust_decimal::Decimal;

    fn candidate(model: &str, is_local: bool, price_in: i64) -> ModelCandidate {
        ModelCandidate {
            model: model.to_string(),
            price: Some(ModelPrice { price_in: Decimal::new(price_in, 2), price_out: Decimal::new(price_in * 2, 2) }),
            supports_vision: false,
            supports_tools: true,
            context_window: 128_000,
            reasoning_level: 1,
            avg_latency_ms: 1000,
            is_local,
        }
    }

    fn request() -> RouteRequest {
        RouteRequest { needs_vision: false, needs_tools: true, min_context_window: 8000, cost_sensitivity: CostSensitivity::Medium }
    }

    #[test]
    fn filters_out_candidates_failing_capability_gates() {
        let mut cfg = OrchestratorConfig::default();
        let mut small_context = candidate("openai/gpt-3.5", false, 50);
        small_context.context_window = 4000;
        cfg = cfg.with_model(small_context);
        cfg = cfg.with_model(candidate("openai/gpt-4o", false, 250));
        let picked = route(&cfg, &request());
        assert_eq!(picked, Some("openai/gpt-4o".to_string()));
    }

    #[test]
    fn prefers_local_model_within_threshold_of_top_score() {
        let mut cfg = OrchestratorConfig::default();
        cfg = cfg.with_model(candidate("openai/gpt-4o", false, 250));
        let mut local = candidate("ollama/llama3", true, 0);
        local.reasoning_level = 1;
        cfg = cfg.with_model(local);
        let picked = route(&cfg, &request());
        assert_eq!(picked, Some("ollama/llama3".to_string()));
    }

    #[test]
    fn returns_none_when_nothing_passes_gates() {
        let mut cfg = OrchestratorConfig::default();
        let mut no_tools = candidate("openai/gpt-4o", false, 250);
        no_tools.supports_tools = false;
        cfg = cfg.with_model(no_tools);
        assert_eq!(route(&cfg, &request()), None);
    }

    #[test]
    fn empty_model_table_routes_to_none() {
        let cfg = OrchestratorConfig::default();
        assert_eq!(route(&cfg, &request()), None);
    }
}
