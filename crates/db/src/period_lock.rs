//! Period lock state over the `fiscal_periods` table.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement, Value};
use tally_core::fiscal::{PeriodLockError, PeriodLockState, PeriodLockStatus, PeriodState};
use tally_shared::types::{CompanyId, PeriodId};
use uuid::Uuid;

const SELECT_PERIOD_FOR_DATE: &str = r"
SELECT id::text AS period_id, status::text AS status
FROM fiscal_periods
WHERE organization_id = $1
  AND start_date <= $2
  AND end_date >= $2
ORDER BY is_adjustment_period, start_date DESC
LIMIT 1";

/// The fiscal period covering a date.
#[derive(Debug, Clone, FromQueryResult)]
pub struct PeriodRow {
    /// Period id.
    pub period_id: String,
    /// `OPEN`, `SOFT_CLOSE` or `CLOSED`.
    pub status: String,
}

/// Maps a fiscal period status to a lock status.
///
/// Only `OPEN` accepts postings. `SOFT_CLOSE`, `CLOSED` and anything
/// unrecognised resolve to locked.
#[must_use]
pub fn lock_status(status: &str) -> PeriodLockStatus {
    match status {
        "OPEN" => PeriodLockStatus::Open,
        _ => PeriodLockStatus::Locked,
    }
}

/// Converts an optional period row into a period state.
#[must_use]
pub fn period_state(row: Option<PeriodRow>) -> PeriodState {
    row.map_or_else(PeriodState::unknown, |row| PeriodState {
        state: lock_status(&row.status),
        period_id: Some(PeriodId::new(row.period_id)),
    })
}

/// Period lock state backed by Postgres.
///
/// Resolves a date to the fiscal period whose range contains it; regular
/// periods win over adjustment periods covering the same date.
#[derive(Debug, Clone)]
pub struct PgPeriodLockState {
    db: DatabaseConnection,
}

impl PgPeriodLockState {
    /// Creates a new period lock state.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PeriodLockState for PgPeriodLockState {
    async fn get_period_state_for_date(
        &self,
        company_id: &CompanyId,
        date: NaiveDate,
    ) -> Result<PeriodState, PeriodLockError> {
        let Ok(organization_id) = Uuid::parse_str(company_id.as_str()) else {
            return Ok(PeriodState::unknown());
        };

        let row = PeriodRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            SELECT_PERIOD_FOR_DATE,
            [Value::from(organization_id), Value::from(date)],
        ))
        .one(&self.db)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, %company_id, %date, "period lookup failed");
            PeriodLockError::Unavailable(e.to_string())
        })?;

        Ok(period_state(row))
    }
}
