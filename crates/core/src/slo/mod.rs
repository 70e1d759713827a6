//! Service level objective evaluation.
//!
//! A pure scoring of one metrics window against latency and error thresholds.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tally_shared::config::SloConfig;
use thiserror::Error;

/// Invalid SLO configuration.
#[derive(Debug, Error)]
pub enum SloError {
    /// The error rate threshold is not a decimal number.
    #[error("Invalid max error rate: {0:?}")]
    InvalidErrorRate(String),
}

impl SloError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidErrorRate(_) => "INVALID_SLO_THRESHOLD",
        }
    }
}

/// Thresholds a window is scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SloThresholds {
    /// Highest acceptable error rate, in percent.
    pub max_error_rate_pct: Decimal,
    /// Highest acceptable p95 latency.
    pub max_p95_latency_ms: u64,
}

impl SloThresholds {
    /// Reads thresholds from configuration.
    pub fn from_config(config: &SloConfig) -> Result<Self, SloError> {
        let max_error_rate_pct = config
            .max_error_rate_pct
            .parse::<Decimal>()
            .map_err(|_| SloError::InvalidErrorRate(config.max_error_rate_pct.clone()))?;
        Ok(Self {
            max_error_rate_pct,
            max_p95_latency_ms: config.max_p95_latency_ms,
        })
    }
}

/// Request metrics over one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SloWindow {
    /// Requests served.
    pub total_requests: u64,
    /// Requests that failed.
    pub error_requests: u64,
    /// 95th percentile latency.
    pub p95_latency_ms: u64,
}

/// SLO verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SloStatus {
    /// No threshold breached.
    Pass,
    /// One threshold breached.
    Warn,
    /// Two or more thresholds breached.
    Fail,
}

/// Result of scoring a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SloEvaluation {
    /// Verdict.
    pub status: SloStatus,
    /// `error_requests / total_requests * 100`, two decimal places.
    pub error_rate_pct: Decimal,
    /// One entry per breached threshold.
    pub reasons: Vec<String>,
}

/// Scores `window` against `thresholds`. A threshold is breached when the
/// observed value is strictly greater than it.
#[must_use]
pub fn evaluate_slo(window: &SloWindow, thresholds: &SloThresholds) -> SloEvaluation {
    let error_rate_pct = error_rate_pct(window);
    let mut reasons = Vec::new();

    if error_rate_pct > thresholds.max_error_rate_pct {
        reasons.push(format!(
            "error rate {error_rate_pct}% exceeds {}%",
            thresholds.max_error_rate_pct
        ));
    }
    if window.p95_latency_ms > thresholds.max_p95_latency_ms {
        reasons.push(format!(
            "p95 latency {}ms exceeds {}ms",
            window.p95_latency_ms, thresholds.max_p95_latency_ms
        ));
    }

    let status = match reasons.len() {
        0 => SloStatus::Pass,
        1 => SloStatus::Warn,
        _ => SloStatus::Fail,
    };

    SloEvaluation {
        status,
        error_rate_pct,
        reasons,
    }
}

fn error_rate_pct(window: &SloWindow) -> Decimal {
    if window.total_requests == 0 {
        return Decimal::new(0, 2);
    }
    let mut rate = (Decimal::from(window.error_requests) * Decimal::ONE_HUNDRED
        / Decimal::from(window.total_requests))
    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rate.rescale(2);
    rate
}
