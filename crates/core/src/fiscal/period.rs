//! Period lock state per company and calendar date.
//!
//! A date resolves to OPEN or LOCKED plus an optional period identifier. Once a
//! date resolves to LOCKED, the write path must reject postings dated in it.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CompanyId, PeriodId};
use thiserror::Error;

use crate::ledger::LedgerStoreError;

/// Lock status of an accounting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PeriodLockStatus {
    /// Postings are accepted.
    Open,
    /// The period is frozen.
    Locked,
}

impl PeriodLockStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Locked => "LOCKED",
        }
    }
}

/// Resolved state for one (company, date) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodState {
    /// The period containing the date, if one is known.
    pub period_id: Option<PeriodId>,
    /// Lock status.
    pub state: PeriodLockStatus,
}

impl PeriodState {
    /// State returned for dates no period covers.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            period_id: None,
            state: PeriodLockStatus::Open,
        }
    }

    /// Returns true if postings dated in this period must be rejected.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state == PeriodLockStatus::Locked
    }
}

/// Period lookup failure.
#[derive(Debug, Error)]
pub enum PeriodLockError {
    /// The backing engine failed.
    #[error("Period lock state unavailable: {0}")]
    Unavailable(String),
}

impl PeriodLockError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "PERIOD_LOCK_UNAVAILABLE",
        }
    }
}

/// Point lookup of period state by date.
#[async_trait]
pub trait PeriodLockState: Send + Sync {
    /// Resolves the state of `date` for `company_id`.
    ///
    /// Dates no period covers resolve to [`PeriodState::unknown`] rather than failing.
    async fn get_period_state_for_date(
        &self,
        company_id: &CompanyId,
        date: NaiveDate,
    ) -> Result<PeriodState, PeriodLockError>;
}

/// Explicit (company, date) → state table.
///
/// Exact-date lookup only; no range interpolation.
#[derive(Debug, Default)]
pub struct InMemoryPeriodLockState {
    entries: DashMap<(CompanyId, NaiveDate), PeriodState>,
}

impl InMemoryPeriodLockState {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state of a date.
    pub fn set_state(&self, company_id: CompanyId, date: NaiveDate, state: PeriodState) {
        self.entries.insert((company_id, date), state);
    }

    /// Marks a date as locked under `period_id`.
    pub fn lock(&self, company_id: CompanyId, date: NaiveDate, period_id: PeriodId) {
        self.set_state(
            company_id,
            date,
            PeriodState {
                period_id: Some(period_id),
                state: PeriodLockStatus::Locked,
            },
        );
    }

    /// Marks a date as open under `period_id`.
    pub fn open(&self, company_id: CompanyId, date: NaiveDate, period_id: PeriodId) {
        self.set_state(
            company_id,
            date,
            PeriodState {
                period_id: Some(period_id),
                state: PeriodLockStatus::Open,
            },
        );
    }
}

#[async_trait]
impl PeriodLockState for InMemoryPeriodLockState {
    async fn get_period_state_for_date(
        &self,
        company_id: &CompanyId,
        date: NaiveDate,
    ) -> Result<PeriodState, PeriodLockError> {
        Ok(self
            .entries
            .get(&(company_id.clone(), date))
            .map_or_else(PeriodState::unknown, |entry| entry.value().clone()))
    }
}

/// Rejects postings dated in a locked period.
///
/// # Errors
///
/// Returns [`LedgerStoreError::PeriodLocked`] for locked dates and
/// [`LedgerStoreError::Unavailable`] if the lookup itself fails.
pub async fn ensure_posting_allowed(
    lock_state: &dyn PeriodLockState,
    company_id: &CompanyId,
    date: NaiveDate,
) -> Result<(), LedgerStoreError> {
    let state = lock_state
        .get_period_state_for_date(company_id, date)
        .await
        .map_err(|e| LedgerStoreError::Unavailable(e.to_string()))?;

    if state.is_locked() {
        tracing::debug!(%company_id, %date, "posting rejected: period locked");
        return Err(LedgerStoreError::PeriodLocked {
            period: state
                .period_id
                .map_or_else(|| date.to_string(), PeriodId::into_inner),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_date_defaults_to_open() {
        let state = InMemoryPeriodLockState::new();
        let resolved = state
            .get_period_state_for_date(&CompanyId::from("co-1"), date(2030, 1, 1))
            .await
            .unwrap();
        assert_eq!(resolved, PeriodState::unknown());
        assert_eq!(resolved.period_id, None);
        assert_eq!(resolved.state, PeriodLockStatus::Open);
    }

    #[tokio::test]
    async fn test_exact_date_lookup() {
        let state = InMemoryPeriodLockState::new();
        state.lock(CompanyId::from("co-1"), date(2024, 1, 31), PeriodId::from("2024-01"));

        let locked = state
            .get_period_state_for_date(&CompanyId::from("co-1"), date(2024, 1, 31))
            .await
            .unwrap();
        assert!(locked.is_locked());
        assert_eq!(locked.period_id, Some(PeriodId::from("2024-01")));

        // No range interpolation: the previous day is unknown.
        let neighbour = state
            .get_period_state_for_date(&CompanyId::from("co-1"), date(2024, 1, 30))
            .await
            .unwrap();
        assert_eq!(neighbour, PeriodState::unknown());

        // Other companies are unaffected.
        let other = state
            .get_period_state_for_date(&CompanyId::from("co-2"), date(2024, 1, 31))
            .await
            .unwrap();
        assert!(!other.is_locked());
    }

    #[tokio::test]
    async fn test_ensure_posting_allowed() {
        let state = InMemoryPeriodLockState::new();
        let company = CompanyId::from("co-1");
        state.lock(company.clone(), date(2024, 1, 31), PeriodId::from("2024-01"));
        state.open(company.clone(), date(2024, 2, 1), PeriodId::from("2024-02"));

        let err = ensure_posting_allowed(&state, &company, date(2024, 1, 31))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerStoreError::PeriodLocked { ref period } if period == "2024-01"));

        assert!(ensure_posting_allowed(&state, &company, date(2024, 2, 1)).await.is_ok());
        assert!(ensure_posting_allowed(&state, &company, date(2024, 3, 1)).await.is_ok());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(PeriodLockStatus::Open.as_str(), "OPEN");
        assert_eq!(
            serde_json::to_string(&PeriodLockStatus::Locked).unwrap(),
            "\"LOCKED\""
        );
    }
}
