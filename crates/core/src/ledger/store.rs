//! The ledger store contract.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tally_shared::types::{AccountId, Cents, CompanyId};

use super::balance::{AccountSnapshot, net_deltas_by_account, snapshots_by_account};
use super::error::LedgerStoreError;
use super::transaction::{NewTransaction, Transaction};

/// Read/append access to posted transactions.
///
/// Implementations may be in-memory (tests, fixtures) or backed by a relational
/// engine. Only [`LedgerStore::list_posted_transactions`] is required by the
/// trial balance builder; the other capabilities serve other consumers.
///
/// Windows are half-open: `from` is inclusive, `to` is exclusive.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Lists posted transactions with `from <= posted_at < to`, ordered by posting time.
    ///
    /// With `from = None`, every transaction strictly before `to` is returned.
    async fn list_posted_transactions(
        &self,
        company_id: &CompanyId,
        from: Option<DateTime<Utc>>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerStoreError>;

    /// Finds a posted transaction by its number.
    async fn get_posted_transaction_by_number(
        &self,
        company_id: &CompanyId,
        transaction_number: &str,
    ) -> Result<Option<Transaction>, LedgerStoreError>;

    /// Appends a transaction. Read-only stores return [`LedgerStoreError::NotSupported`].
    async fn commit_append_only(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, LedgerStoreError>;

    /// Net cents per account for everything posted strictly before `as_of`.
    async fn get_account_balances_cents(
        &self,
        company_id: &CompanyId,
        as_of: DateTime<Utc>,
    ) -> Result<BTreeMap<AccountId, Cents>, LedgerStoreError> {
        let transactions = self.list_posted_transactions(company_id, None, as_of).await?;
        Ok(net_deltas_by_account(&transactions)?)
    }

    /// Debit/credit totals per account over `[from, to)`, sorted by account id.
    async fn get_account_snapshots(
        &self,
        company_id: &CompanyId,
        from: Option<DateTime<Utc>>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AccountSnapshot>, LedgerStoreError> {
        let transactions = self.list_posted_transactions(company_id, from, to).await?;
        Ok(snapshots_by_account(&transactions)?)
    }
}
