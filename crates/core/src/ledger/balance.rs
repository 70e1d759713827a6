//! Per-account balance accumulation.
//!
//! Balances are derived, never stored: they are recomputed from posted lines
//! on demand. All arithmetic is checked integer cents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, Cents, MoneyError};

use super::transaction::Transaction;

/// Debit/credit totals for one account over a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// The account ID.
    pub account_id: AccountId,
    /// Total debit amount.
    pub debit_total: Cents,
    /// Total credit amount.
    pub credit_total: Cents,
    /// Net effect (`debit_total - credit_total`).
    pub net: Cents,
}

impl AccountSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            debit_total: Cents::ZERO,
            credit_total: Cents::ZERO,
            net: Cents::ZERO,
        }
    }

    /// Adds a debit amount.
    pub fn add_debit(&mut self, amount: Cents) -> Result<(), MoneyError> {
        self.debit_total = self.debit_total.checked_add(amount)?;
        self.net = self.debit_total.checked_sub(self.credit_total)?;
        Ok(())
    }

    /// Adds a credit amount.
    pub fn add_credit(&mut self, amount: Cents) -> Result<(), MoneyError> {
        self.credit_total = self.credit_total.checked_add(amount)?;
        self.net = self.debit_total.checked_sub(self.credit_total)?;
        Ok(())
    }
}

/// Sums `debit - credit` per account across every line of `transactions`.
///
/// Keys are ordered by account id.
pub fn net_deltas_by_account<'a, I>(transactions: I) -> Result<BTreeMap<AccountId, Cents>, MoneyError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut deltas: BTreeMap<AccountId, Cents> = BTreeMap::new();
    for transaction in transactions {
        for line in &transaction.lines {
            let delta = line.delta_cents()?;
            let entry = deltas.entry(line.account_id.clone()).or_default();
            *entry = entry.checked_add(delta)?;
        }
    }
    Ok(deltas)
}

/// Builds debit/credit snapshots per account, sorted by account id.
pub fn snapshots_by_account<'a, I>(transactions: I) -> Result<Vec<AccountSnapshot>, MoneyError>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut snapshots: BTreeMap<AccountId, AccountSnapshot> = BTreeMap::new();
    for transaction in transactions {
        for line in &transaction.lines {
            let snapshot = snapshots
                .entry(line.account_id.clone())
                .or_insert_with(|| AccountSnapshot::new(line.account_id.clone()));
            snapshot.add_debit(line.debit_cents()?)?;
            snapshot.add_credit(line.credit_cents()?)?;
        }
    }
    Ok(snapshots.into_values().collect())
}
