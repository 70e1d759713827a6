//! Retention decisions with fail-safe legal hold handling.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::TenantId;
use thiserror::Error;

use super::policy::{RetentionDataType, RetentionPolicy};
use crate::canonical::serde_fmt::iso_millis_format;

/// Legal hold lookup failure.
#[derive(Debug, Error)]
pub enum LegalHoldError {
    /// The legal hold registry could not be reached or answered with an error.
    #[error("Legal hold lookup failed: {0}")]
    Unavailable(String),
}

impl LegalHoldError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "LEGAL_HOLD_UNAVAILABLE",
        }
    }
}

/// External legal hold registry.
#[async_trait]
pub trait LegalHoldChecker: Send + Sync {
    /// Whether data of `data_type` owned by `tenant_id` is under legal hold.
    async fn is_under_legal_hold(
        &self,
        tenant_id: &TenantId,
        data_type: RetentionDataType,
    ) -> Result<bool, LegalHoldError>;
}

/// Why a retention decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionReason {
    /// No checker was supplied; hold status is unknown.
    LegalHoldUnknownFailSafe,
    /// The checker reported an active hold.
    LegalHoldActive,
    /// Not held and not yet expired.
    WithinRetentionWindow,
    /// Not held and past expiry.
    Expired,
    /// The checker failed; hold status is unknown.
    LegalHoldCheckFailedFailSafe,
}

impl RetentionReason {
    /// Returns the string representation of the reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LegalHoldUnknownFailSafe => "legal_hold_unknown_fail_safe",
            Self::LegalHoldActive => "legal_hold_active",
            Self::WithinRetentionWindow => "within_retention_window",
            Self::Expired => "expired",
            Self::LegalHoldCheckFailedFailSafe => "legal_hold_check_failed_fail_safe",
        }
    }
}

/// Outcome of a retention evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionEvaluation {
    /// Whether the data must be kept.
    pub retain: bool,
    /// When the normal retention period ends.
    #[serde(with = "iso_millis_format")]
    pub expires_at: DateTime<Utc>,
    /// Whether a legal hold is (or must be assumed to be) in force.
    pub legal_hold: bool,
    /// Decision reason.
    pub reason: RetentionReason,
}

/// Service for retention decisions.
pub struct RetentionService;

impl RetentionService {
    /// Evaluates whether data recorded at `event_timestamp` must be retained at `now`.
    ///
    /// Without a checker, or when the checker fails, the data is treated as
    /// held and retained. Otherwise data expires once `now >= expires_at`.
    #[tracing::instrument(skip(policy, checker), fields(tenant_id = %tenant_id, data_type = %data_type))]
    pub async fn evaluate(
        policy: &RetentionPolicy,
        checker: Option<&dyn LegalHoldChecker>,
        tenant_id: &TenantId,
        data_type: RetentionDataType,
        event_timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> RetentionEvaluation {
        let expires_at = Self::expires_at(policy, data_type, event_timestamp);

        let (legal_hold, reason) = match checker {
            None => (true, RetentionReason::LegalHoldUnknownFailSafe),
            Some(checker) => match checker.is_under_legal_hold(tenant_id, data_type).await {
                Ok(true) => (true, RetentionReason::LegalHoldActive),
                Ok(false) if now >= expires_at => (false, RetentionReason::Expired),
                Ok(false) => (false, RetentionReason::WithinRetentionWindow),
                Err(err) => {
                    tracing::warn!(error = %err, "legal hold lookup failed, retaining");
                    (true, RetentionReason::LegalHoldCheckFailedFailSafe)
                }
            },
        };

        let evaluation = RetentionEvaluation {
            retain: reason != RetentionReason::Expired,
            expires_at,
            legal_hold,
            reason,
        };
        tracing::debug!(retain = evaluation.retain, reason = reason.as_str(), "retention evaluated");
        evaluation
    }

    /// `event_timestamp` plus the policy period. Saturates at the latest
    /// representable instant, which keeps the data.
    #[must_use]
    pub fn expires_at(
        policy: &RetentionPolicy,
        data_type: RetentionDataType,
        event_timestamp: DateTime<Utc>,
    ) -> DateTime<Utc> {
        event_timestamp
            .checked_add_signed(TimeDelta::days(i64::from(policy.days_for(data_type))))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
