//! Evidence error types.

use tally_shared::AppError;
use thiserror::Error;

use crate::canonical::CanonicalError;
use crate::fiscal::PeriodLockError;
use crate::reports::ReportError;

/// Errors that abort an evidence build. No partial bundle is ever returned.
#[derive(Debug, Error)]
pub enum EvidenceError {
    /// Trial balance computation failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Period state lookup failed.
    #[error(transparent)]
    PeriodLock(#[from] PeriodLockError),

    /// The bundle could not be canonicalized.
    #[error(transparent)]
    Canonical(#[from] CanonicalError),
}

impl EvidenceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Report(err) => err.error_code(),
            Self::PeriodLock(err) => err.error_code(),
            Self::Canonical(err) => err.error_code(),
        }
    }
}

impl From<EvidenceError> for AppError {
    fn from(err: EvidenceError) -> Self {
        match err {
            EvidenceError::Report(inner) => inner.into(),
            EvidenceError::PeriodLock(inner) => Self::ExternalService(inner.to_string()),
            EvidenceError::Canonical(inner) => Self::Internal(inner.to_string()),
        }
    }
}
