//! Compliance error types.

use tally_shared::AppError;
use thiserror::Error;

use crate::canonical::CanonicalError;

/// Readiness runner failure (distinct from a gate that ran and failed).
#[derive(Debug, Error)]
pub enum ReadinessError {
    /// The runner could not execute its gates.
    #[error("Readiness gates could not run: {0}")]
    Unavailable(String),
}

impl ReadinessError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "READINESS_UNAVAILABLE",
        }
    }
}

/// Errors that abort a snapshot build.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The readiness runner failed.
    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    /// The snapshot could not be canonicalized.
    #[error(transparent)]
    Canonical(#[from] CanonicalError),
}

impl SnapshotError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Readiness(err) => err.error_code(),
            Self::Canonical(err) => err.error_code(),
        }
    }
}

impl From<SnapshotError> for AppError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Readiness(inner) => Self::ExternalService(inner.to_string()),
            SnapshotError::Canonical(inner) => Self::Internal(inner.to_string()),
        }
    }
}
