//! Classifies a user input's complexity and derives routing hints from
//! it, ahead of any backend call.

use serde::{Deserialize, Serialize};

/// Coarse complexity bucket, driving the output-token table and default
/// iteration count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Short, single-fact asks.
    Simple,
    /// Multi-step but bounded asks.
    Moderate,
    /// Open-ended, research- or design-shaped asks.
    Complex,
}

/// How cost-averse the router should be for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostSensitivity {
    /// Prefer cheap or local models even at some quality cost.
    High,
    /// Balance cost and capability.
    Medium,
    /// Prioritize capability over cost.
    Low,
}

/// Hints derived from the input, used by the router to filter and score
/// candidate models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHints {
    /// The agent carries tools it may need to invoke.
    pub needs_tools: bool,
    /// The input references image content.
    pub needs_vision: bool,
    /// The input is long enough to need a large context window.
    pub needs_long_context: bool,
    /// The ask calls for multi-step reasoning rather than recall.
    pub needs_reasoning: bool,
    /// The ask is conversational and latency-sensitive.
    pub needs_speed: bool,
    /// How cost-averse this request should be treated.
    pub cost_sensitivity: CostSensitivity,
}

const REASONING_MARKERS: &[&str] = &[
    "why", "explain", "design", "architecture", "compare", "analyze", "plan", "debug", "optimize",
];
const VISION_MARKERS: &[&str] = &["image", "photo", "screenshot", "picture", "diagram"];
const SPEED_MARKERS: &[&str] = &["quick", "quickly", "asap", "now", "hurry"];

/// Classify an input and derive routing hints. `tools_available` is
/// whether the agent carries any tools at all.
pub fn analyze(input: &str, tools_available: bool) -> (Complexity, TaskHints) {
    let lower = input.to_lowercase();
    let word_count = input.split_whitespace().count();
    let has_reasoning_marker = REASONING_MARKERS.iter().any(|m| lower.contains(m));
    let has_vision_marker = VISION_MARKERS.iter().any(|m| lower.contains(m));
    let has_speed_marker = SPEED_MARKERS.iter().any(|m| lower.contains(m));

    let complexity = if word_count > 120 || (has_reasoning_marker && word_count > 40) {
        Complexity::Complex
    } else if word_count > 25 || has_reasoning_marker {
        Complexity::Moderate
    } else {
        Complexity::Simple
    };

    let cost_sensitivity = match complexity {
        Complexity::Simple => CostSensitivity::High,
        Complexity::Moderate => CostSensitivity::Medium,
        Complexity::Complex => CostSensitivity::Low,
    };

    let hints = TaskHints {
        needs_tools: tools_available,
        needs_vision: has_vision_marker,
        needs_long_context: word_count > 400,
        needs_reasoning: has_reasoning_marker || complexity == Complexity::Complex,
        needs_speed: has_speed_marker,
        cost_sensitivity,
    };

    (complexity, hints)
}
