//! Append-only double-entry ledger.
//!
//! This module implements the ledger primitives the attestation builders consume:
//! - Ledger lines (debits and credits as decimal strings)
//! - Transaction aggregates
//! - Per-account balance accumulation
//! - Posting validation
//! - The `LedgerStore` contract
//! - In-memory and read-only store implementations

pub mod balance;
pub mod entry;
pub mod error;
pub mod memory;
pub mod store;
pub mod transaction;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use balance::{AccountSnapshot, net_deltas_by_account, snapshots_by_account};
pub use entry::LedgerLine;
pub use error::LedgerStoreError;
pub use memory::{InMemoryLedgerStore, ReadOnlyLedgerStore};
pub use store::LedgerStore;
pub use transaction::{NewTransaction, Transaction};
pub use validation::{LedgerValidationError, validate_posting};
