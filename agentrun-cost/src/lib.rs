//! Ahead-of-run cost estimation, model routing, and spend enforcement.

mod analyzer;
mod estimate;
mod ledger;
mod router;

pub use analyzer::{analyze, Complexity, CostSensitivity, TaskHints};
pub use estimate::{estimate_cost, is_local_runner, CostBreakdown, CostEstimate, EstimateOptions};
pub use ledger::{CostSummary, SpendLedger};
pub use router::{route, RouteRequest};
