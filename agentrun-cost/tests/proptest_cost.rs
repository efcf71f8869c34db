//! Property-based tests: cost estimation invariants.

use agentrun_cost::{estimate_cost, EstimateOptions};
use agentrun_types::agent::Agent;
use agentrun_types::config::OrchestratorConfig;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn agent_with(model: &str, instructions: &str) -> Agent {
    Agent::builder("assistant", model, instructions).build()
}

proptest! {
    /// Invariant 5, applied ahead of run: the point estimate always
    /// falls between the min and max bounds, whatever the input text or
    /// registered price happens to be.
    #[test]
    fn expected_cost_is_bracketed_by_min_and_max(
        instructions in "[a-zA-Z .]{0,200}",
        input in "[a-zA-Z .]{0,400}",
        price_in_cents in 0i64..5000,
        price_out_cents in 0i64..5000,
    ) {
        let agent = agent_with("openai/gpt-4o", &instructions);
        let config = OrchestratorConfig::default().with_price(
            "openai/gpt-4o",
            Decimal::new(price_in_cents, 2),
            Decimal::new(price_out_cents, 2),
        );
        let est = estimate_cost(&agent, &input, &config, &EstimateOptions::default());
        prop_assert!(est.min_cost <= est.expected_cost);
        prop_assert!(est.expected_cost <= est.max_cost);
        prop_assert!(est.min_cost >= Decimal::ZERO);
    }

    /// Invariant 5's zero case: with no pricing registered for the
    /// model, the cost is zero no matter what the input is.
    #[test]
    fn unpriced_model_always_costs_zero(
        instructions in "[a-zA-Z .]{0,200}",
        input in "[a-zA-Z .]{0,400}",
    ) {
        let agent = agent_with("openai/gpt-4o-unpriced", &instructions);
        let config = OrchestratorConfig::default();
        let est = estimate_cost(&agent, &input, &config, &EstimateOptions::default());
        prop_assert_eq!(est.min_cost, Decimal::ZERO);
        prop_assert_eq!(est.max_cost, Decimal::ZERO);
        prop_assert_eq!(est.expected_cost, Decimal::ZERO);
    }

    /// A local-runner model is always free, regardless of pricing table
    /// contents, since it never crosses a billed API boundary.
    #[test]
    fn local_runner_is_always_free(
        price_in_cents in 0i64..5000,
        price_out_cents in 0i64..5000,
    ) {
        let agent = agent_with("ollama/llama3", "Be brief.");
        let config = OrchestratorConfig::default().with_price(
            "ollama/llama3",
            Decimal::new(price_in_cents, 2),
            Decimal::new(price_out_cents, 2),
        );
        let est = estimate_cost(&agent, "hello", &config, &EstimateOptions::default());
        prop_assert_eq!(est.expected_cost, Decimal::ZERO);
    }
}
