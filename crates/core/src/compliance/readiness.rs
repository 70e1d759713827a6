//! Readiness gates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{Cents, CompanyId};

use super::error::ReadinessError;
use crate::canonical::Clock;
use crate::canonical::serde_fmt::iso_millis_format;
use crate::ledger::{LedgerStore, net_deltas_by_account};

/// Overall readiness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReadinessStatus {
    /// Every gate passed.
    Pass,
    /// At least one gate failed.
    Fail,
}

/// Outcome of one gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessGateResult {
    /// Gate name.
    pub gate: String,
    /// Whether the gate passed.
    pub ok: bool,
    /// Detail, mostly for failures.
    pub message: Option<String>,
}

/// Result of a readiness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    /// Overall verdict.
    pub status: ReadinessStatus,
    /// Per-gate outcomes, in execution order.
    pub results: Vec<ReadinessGateResult>,
    /// When the run happened.
    #[serde(with = "iso_millis_format")]
    pub timestamp: DateTime<Utc>,
}

impl ReadinessReport {
    /// Builds a report, deriving the status from the results.
    #[must_use]
    pub fn from_results(results: Vec<ReadinessGateResult>, timestamp: DateTime<Utc>) -> Self {
        let status = if results.iter().all(|r| r.ok) {
            ReadinessStatus::Pass
        } else {
            ReadinessStatus::Fail
        };
        Self {
            status,
            results,
            timestamp,
        }
    }
}

/// Runs readiness gates against a ledger store.
#[async_trait]
pub trait ReadinessGateRunner: Send + Sync {
    /// Executes every gate.
    async fn run_readiness_gates(
        &self,
        store: &dyn LedgerStore,
    ) -> Result<ReadinessReport, ReadinessError>;
}

/// Gate: the store answers a listing for the company.
pub const GATE_LEDGER_STORE_REACHABLE: &str = "ledger_store_reachable";

/// Gate: the company's closing balances net to zero.
pub const GATE_LEDGER_BALANCED: &str = "ledger_balanced";

/// Ledger gates for a fixed set of companies.
///
/// A failing store call fails its gate; it does not fail the run.
#[derive(Debug, Clone)]
pub struct LedgerReadinessGates {
    companies: Vec<CompanyId>,
    clock: Clock,
}

impl LedgerReadinessGates {
    /// Creates gates for `companies`, timestamped by `clock`.
    #[must_use]
    pub fn new(companies: Vec<CompanyId>, clock: Clock) -> Self {
        Self { companies, clock }
    }
}

#[async_trait]
impl ReadinessGateRunner for LedgerReadinessGates {
    async fn run_readiness_gates(
        &self,
        store: &dyn LedgerStore,
    ) -> Result<ReadinessReport, ReadinessError> {
        let now = self.clock.now();
        let mut results = Vec::with_capacity(self.companies.len() * 2);

        for company_id in &self.companies {
            match store.list_posted_transactions(company_id, None, DateTime::<Utc>::MAX_UTC).await {
                Ok(transactions) => {
                    results.push(ReadinessGateResult {
                        gate: GATE_LEDGER_STORE_REACHABLE.to_string(),
                        ok: true,
                        message: Some(format!("{company_id}: {} transactions", transactions.len())),
                    });

                    let balanced = net_deltas_by_account(&transactions).and_then(|deltas| {
                        Cents::checked_sum(deltas.into_values())
                    });
                    results.push(match balanced {
                        Ok(total) if total.is_zero() => ReadinessGateResult {
                            gate: GATE_LEDGER_BALANCED.to_string(),
                            ok: true,
                            message: Some(company_id.to_string()),
                        },
                        Ok(total) => ReadinessGateResult {
                            gate: GATE_LEDGER_BALANCED.to_string(),
                            ok: false,
                            message: Some(format!("{company_id}: ledger off by {total}")),
                        },
                        Err(err) => ReadinessGateResult {
                            gate: GATE_LEDGER_BALANCED.to_string(),
                            ok: false,
                            message: Some(format!("{company_id}: {err}")),
                        },
                    });
                }
                Err(err) => {
                    tracing::warn!(%company_id, error = %err, "readiness: ledger store unreachable");
                    results.push(ReadinessGateResult {
                        gate: GATE_LEDGER_STORE_REACHABLE.to_string(),
                        ok: false,
                        message: Some(format!("{company_id}: {err}")),
                    });
                    results.push(ReadinessGateResult {
                        gate: GATE_LEDGER_BALANCED.to_string(),
                        ok: false,
                        message: Some(format!("{company_id}: skipped, store unreachable")),
                    });
                }
            }
        }

        let report = ReadinessReport::from_results(results, now);
        tracing::debug!(status = ?report.status, gates = report.results.len(), "readiness gates run");
        Ok(report)
    }
}
