//! Data retention and legal hold.
//!
//! Decides whether a class of audit data must still be kept. Any doubt about
//! legal hold resolves toward retention, never toward deletion.

pub mod evaluator;
pub mod policy;

pub use evaluator::{
    LegalHoldChecker, LegalHoldError, RetentionEvaluation, RetentionReason, RetentionService,
};
pub use policy::{RetentionDataType, RetentionPolicy};
