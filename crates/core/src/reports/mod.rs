//! Financial report generation.
//!
//! This module computes the trial balance consumed by audit evidence:
//! per-account opening, activity and closing balances over a date range,
//! with an integrity digest over its canonical form.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
