//! Report error types.

use chrono::{DateTime, Utc};
use tally_shared::AppError;
use tally_shared::types::MoneyError;
use thiserror::Error;

use crate::canonical::CanonicalError;
use crate::ledger::LedgerStoreError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {from} is after end {to}")]
    InvalidDateRange {
        /// Range start.
        from: DateTime<Utc>,
        /// Range end.
        to: DateTime<Utc>,
    },

    /// A stored amount could not be parsed or the running total overflowed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The ledger store failed.
    #[error(transparent)]
    Store(#[from] LedgerStoreError),

    /// The canonical form could not be produced.
    #[error(transparent)]
    Canonical(#[from] CanonicalError),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::Money(err) => err.error_code(),
            Self::Store(err) => err.error_code(),
            Self::Canonical(err) => err.error_code(),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidDateRange { .. } | ReportError::Money(_) => {
                Self::Validation(err.to_string())
            }
            ReportError::Store(inner) => inner.into(),
            ReportError::Canonical(_) => Self::Internal(err.to_string()),
        }
    }
}
