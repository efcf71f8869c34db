//! In-memory spend tracking and budget enforcement.
//!
//! `record_cost` and `check_budget` are linearizable: both take the same
//! internal mutex, so a run never observes a torn ledger.

use agentrun_types::config::BudgetCeilings;
use agentrun_types::error::AgentError;
use rust_decimal::Decimal;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry {
    at: Instant,
    amount: Decimal,
}

/// Cumulative spend, summed over the ledger's whole lifetime and over
/// rolling hour/day windows.
#[derive(Debug, Clone, Copy)]
pub struct CostSummary {
    /// Total spend recorded since this ledger was created.
    pub total: Decimal,
    /// Spend recorded in the trailing hour.
    pub last_hour: Decimal,
    /// Spend recorded in the trailing day.
    pub last_day: Decimal,
}

/// Tracks recorded spend and enforces [`BudgetCeilings`] ahead of a run.
#[derive(Default)]
pub struct SpendLedger {
    entries: Mutex<Vec<Entry>>,
}

impl SpendLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record actual spend for a completed run.
    pub fn record_cost(&self, amount: Decimal) {
        let mut entries = self.entries.lock().expect("ledger mutex poisoned");
        entries.push(Entry { at: Instant::now(), amount });
    }

    /// Check whether a projected spend would exceed any configured
    /// ceiling, without recording anything. Refusals are logged at warn
    /// with the projected vs. ceiling amounts.
    pub fn check_budget(&self, projected: Decimal, ceilings: &BudgetCeilings) -> Result<(), AgentError> {
        if let Some(per_run) = ceilings.per_run {
            if projected > per_run {
                tracing::warn!(projected = %projected, ceiling = %per_run, window = "run", "cost ceiling would be exceeded");
                return Err(AgentError::BudgetExceeded(format!(
                    "projected cost {projected} exceeds per-run ceiling {per_run}"
                )));
            }
        }

        let entries = self.entries.lock().expect("ledger mutex poisoned");
        let now = Instant::now();

        if let Some(per_hour) = ceilings.per_hour {
            let spent = windowed_spend(&entries, now, Duration::from_secs(3600));
            if spent + projected > per_hour {
                tracing::warn!(projected = %(spent + projected), ceiling = %per_hour, window = "hour", "cost ceiling would be exceeded");
                return Err(AgentError::BudgetExceeded(format!(
                    "projected hourly spend {} exceeds ceiling {per_hour}",
                    spent + projected
                )));
            }
        }

        if let Some(per_day) = ceilings.per_day {
            let spent = windowed_spend(&entries, now, Duration::from_secs(86400));
            if spent + projected > per_day {
                tracing::warn!(projected = %(spent + projected), ceiling = %per_day, window = "day", "cost ceiling would be exceeded");
                return Err(AgentError::BudgetExceeded(format!(
                    "projected daily spend {} exceeds ceiling {per_day}",
                    spent + projected
                )));
            }
        }

        Ok(())
    }

    /// Snapshot cumulative spend.
    pub fn summary(&self) -> CostSummary {
        let entries = self.entries.lock().expect("ledger mutex poisoned");
        let now = Instant::now();
        CostSummary {
            total: entries.iter().fold(Decimal::ZERO, |acc, e| acc + e.amount),
            last_hour: windowed_spend(&entries, now, Duration::from_secs(3600)),
            last_day: windowed_spend(&entries, now, Duration::from_secs(86400)),
        }
    }
}

fn windowed_spend(entries: &[Entry], now: Instant, window: Duration) -> Decimal {
    entries
        .iter()
        .filter(|e| now.saturating_duration_since(e.at) <= window)
        .fold(Decimal::ZERO, |acc, e| acc + e.amount)
}
