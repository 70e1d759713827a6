//! Audit evidence bundles.
//!
//! A bundle captures, for one request, the admission decision, the trial
//! balance digest and period state of a company, and the retention decision
//! for the evidence itself. Bundles are immutable and carry an integrity hash
//! over their canonical form. Replaying an identical request in deterministic
//! mode yields a byte-identical bundle.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::EvidenceError;
pub use service::{EvidenceDependencies, EvidenceService};
pub use types::*;
