//! Ahead-of-run cost estimation.

use crate::analyzer::{analyze, Complexity};
use agentrun_types::agent::Agent;
use agentrun_types::config::OrchestratorConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Caller-supplied knobs for [`estimate_cost`]; every field has a
/// sensible default derived from the agent itself.
#[derive(Debug, Clone, Default)]
pub struct EstimateOptions {
    /// Override the iteration count the estimate assumes, instead of
    /// deriving it from complexity and tool availability.
    pub iterations: Option<u32>,
}

/// Token and call-count assumptions the estimate was built from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Estimated input tokens for one iteration's prompt.
    pub input_tokens: u64,
    /// Estimated output tokens, midpoint of the complexity table.
    pub output_tokens: u64,
    /// Assumed number of backend iterations.
    pub iterations: u32,
    /// Assumed number of tool calls across the run.
    pub tool_calls: u32,
}

/// The result of ahead-of-run cost estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Lower bound, all iterations at minimum output length.
    pub min_cost: Decimal,
    /// Upper bound, all iterations at maximum output length.
    pub max_cost: Decimal,
    /// Point estimate, all iterations at expected output length.
    pub expected_cost: Decimal,
    /// `0.2..=0.95`: how much this estimate should be trusted.
    pub confidence: f32,
    /// The assumptions behind the estimate.
    pub breakdown: CostBreakdown,
    /// Human-readable caveats, e.g. missing pricing.
    pub warnings: Vec<String>,
}

struct OutputTokenRange {
    min: u64,
    max: u64,
    expected: u64,
}

fn output_range_for(complexity: Complexity) -> OutputTokenRange {
    match complexity {
        Complexity::Simple => OutputTokenRange { min: 50, max: 300, expected: 150 },
        Complexity::Moderate => OutputTokenRange { min: 300, max: 1500, expected: 800 },
        Complexity::Complex => OutputTokenRange { min: 1500, max: 6000, expected: 3000 },
    }
}

fn default_iterations(complexity: Complexity, tool_count: usize) -> u32 {
    let base = match complexity {
        Complexity::Simple | Complexity::Moderate => 1,
        Complexity::Complex => 2,
    };
    let tool_bonus = if tool_count == 0 {
        0
    } else if tool_count <= 2 {
        1
    } else if tool_count <= 6 {
        2
    } else {
        3
    };
    base + tool_bonus
}

fn default_tool_calls(complexity: Complexity, tool_count: usize) -> u32 {
    let calls_per_complexity = match complexity {
        Complexity::Simple => 1,
        Complexity::Moderate => 2,
        Complexity::Complex => 4,
    };
    calls_per_complexity.min(2 * tool_count as u32)
}

/// A model string matching a well-known local-runner naming pattern,
/// e.g. `ollama/llama3` or `local/...`.
pub fn is_local_runner(model: &str) -> bool {
    let lower = model.to_lowercase();
    lower.starts_with("ollama/") || lower.starts_with("local/") || lower.starts_with("vllm/") || lower.contains("localhost")
}

fn char_tokens(text: &str) -> u64 {
    ((text.chars().count() as f64) / 4.0).ceil() as u64
}

/// Estimate the cost of running `agent` against `input`, without making
/// any backend call.
pub fn estimate_cost(agent: &Agent, input: &str, config: &OrchestratorConfig, options: &EstimateOptions) -> CostEstimate {
    let tool_count = agent.tools.len();
    let (complexity, hints) = analyze(input, tool_count > 0);

    let iterations = options.iterations.unwrap_or_else(|| default_iterations(complexity, tool_count));
    let tool_calls = default_tool_calls(complexity, tool_count);
    let input_tokens = char_tokens(&agent.instructions) + char_tokens(input);
    let output_range = output_range_for(complexity);

    let mut warnings = Vec::new();

    if is_local_runner(&agent.model) {
        let breakdown = CostBreakdown {
            input_tokens,
            output_tokens: output_range.expected,
            iterations,
            tool_calls,
        };
        return CostEstimate {
            min_cost: Decimal::ZERO,
            max_cost: Decimal::ZERO,
            expected_cost: Decimal::ZERO,
            confidence: 1.0,
            breakdown,
            warnings,
        };
    }

    let price = config.price_for(&agent.model);
    if price.is_none() {
        warnings.push(format!("no pricing registered for model '{}'; costs are zero", agent.model));
    }

    let million = Decimal::new(1_000_000, 0);
    let cost_for = |output_tokens: u64| -> Decimal {
        match price {
            Some(p) => {
                let total_in = Decimal::from(input_tokens * iterations as u64) * p.price_in;
                let total_out = Decimal::from(output_tokens * iterations as u64) * p.price_out;
                (total_in + total_out) / million
            }
            None => Decimal::ZERO,
        }
    };

    let min_cost = cost_for(output_range.min);
    let max_cost = cost_for(output_range.max);
    let expected_cost = cost_for(output_range.expected);

    let mut confidence: f32 = 0.9;
    if price.is_none() {
        confidence -= 0.3;
    }
    confidence -= match complexity {
        Complexity::Simple => 0.0,
        Complexity::Moderate => 0.1,
        Complexity::Complex => 0.25,
    };
    if hints.needs_tools {
        confidence -= 0.1;
    }
    if tool_calls > 3 {
        confidence -= 0.1;
    }
    let confidence = confidence.clamp(0.2, 0.95);

    CostEstimate {
        min_cost,
        max_cost,
        expected_cost,
        confidence,
        breakdown: CostBreakdown {
            input_tokens,
            output_tokens: output_range.expected,
            iterations,
            tool_calls,
        },
        warnings,
    }
}
