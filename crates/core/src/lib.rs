//! Core attestation logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Collaborators (ledger storage, period locks, legal holds, readiness gates)
//! are consumed through traits; in-memory implementations live alongside them.
//!
//! # Modules
//!
//! - `canonical` - Canonical serialization, digests, stable ids and the injectable clock
//! - `ledger` - Append-only double-entry ledger and the `LedgerStore` contract
//! - `fiscal` - Period lock state
//! - `reports` - Trial balance builder
//! - `retention` - Retention and legal hold evaluation
//! - `evidence` - Audit evidence bundles
//! - `compliance` - Compliance snapshots, control plane state and readiness gates
//! - `slo` - SLO evaluation

pub mod canonical;
pub mod compliance;
pub mod evidence;
pub mod fiscal;
pub mod ledger;
pub mod reports;
pub mod retention;
pub mod slo;
