//! Ledger store error types.

use tally_shared::AppError;
use tally_shared::types::MoneyError;
use thiserror::Error;

use super::validation::LedgerValidationError;

/// Errors that can occur while reading from or appending to a ledger store.
#[derive(Debug, Error)]
pub enum LedgerStoreError {
    /// The store does not implement this capability (e.g., writes on a read-only store).
    #[error("Operation not supported by this ledger store: {0}")]
    NotSupported(&'static str),

    /// A stored or submitted amount is not valid money.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The submitted transaction violates posting rules.
    #[error(transparent)]
    Validation(#[from] LedgerValidationError),

    /// The posting date falls in a locked accounting period.
    #[error("Accounting period {period} is locked, no posting allowed")]
    PeriodLocked {
        /// The locked period (or the date when the period id is unknown).
        period: String,
    },

    /// A transaction with this number already exists for the company.
    #[error("Transaction number already posted: {0}")]
    DuplicateTransactionNumber(String),

    /// The backing engine failed.
    #[error("Ledger store unavailable: {0}")]
    Unavailable(String),
}

impl LedgerStoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotSupported(_) => "NOT_SUPPORTED",
            Self::Money(err) => err.error_code(),
            Self::Validation(err) => err.error_code(),
            Self::PeriodLocked { .. } => "PERIOD_LOCKED",
            Self::DuplicateTransactionNumber(_) => "DUPLICATE_TRANSACTION_NUMBER",
            Self::Unavailable(_) => "LEDGER_STORE_UNAVAILABLE",
        }
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<LedgerStoreError> for AppError {
    fn from(err: LedgerStoreError) -> Self {
        match err {
            LedgerStoreError::NotSupported(_) => Self::NotSupported(err.to_string()),
            LedgerStoreError::Money(_) | LedgerStoreError::Validation(_) => {
                Self::Validation(err.to_string())
            }
            LedgerStoreError::PeriodLocked { .. } => Self::BusinessRule(err.to_string()),
            LedgerStoreError::DuplicateTransactionNumber(_) => Self::Conflict(err.to_string()),
            LedgerStoreError::Unavailable(_) => Self::Database(err.to_string()),
        }
    }
}
