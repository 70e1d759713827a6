//! In-memory ledger stores for tests, fixtures and embedding.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tally_shared::types::{CompanyId, TransactionId};

use super::error::LedgerStoreError;
use super::store::LedgerStore;
use super::transaction::{NewTransaction, Transaction};
use super::validation::validate_posting;
use crate::canonical::stable_id;
use crate::fiscal::{PeriodLockState, ensure_posting_allowed};

/// In-memory, append-only ledger.
///
/// Transactions are grouped per company behind a `DashMap`. Appends validate
/// the posting and, when a period guard is configured, reject dates in locked
/// periods. Transaction ids are derived from company and number, so replaying
/// the same fixture always yields the same ids.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    transactions: DashMap<CompanyId, Vec<Transaction>>,
    period_guard: Option<Arc<dyn PeriodLockState>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store without a period guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects postings into locked periods.
    #[must_use]
    pub fn with_period_guard(lock_state: Arc<dyn PeriodLockState>) -> Self {
        Self {
            transactions: DashMap::new(),
            period_guard: Some(lock_state),
        }
    }

    /// Creates a store pre-loaded with already-posted transactions.
    ///
    /// Fixtures bypass posting validation so tests can model whatever the
    /// underlying engine might return, malformed amounts included.
    #[must_use]
    pub fn with_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let store = Self::new();
        for transaction in transactions {
            store.insert_posted(transaction);
        }
        store
    }

    /// Loads an already-posted transaction without validation.
    pub fn insert_posted(&self, transaction: Transaction) {
        self.transactions
            .entry(transaction.company_id.clone())
            .or_default()
            .push(transaction);
    }

    /// Number of transactions held for `company_id`.
    #[must_use]
    pub fn len_for(&self, company_id: &CompanyId) -> usize {
        self.transactions.get(company_id).map_or(0, |txs| txs.len())
    }

    fn transaction_id(company_id: &CompanyId, transaction_number: &str) -> TransactionId {
        TransactionId::new(stable_id("txn", &format!("{company_id}:{transaction_number}")))
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn list_posted_transactions(
        &self,
        company_id: &CompanyId,
        from: Option<DateTime<Utc>>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        let mut matching: Vec<Transaction> = self
            .transactions
            .get(company_id)
            .map(|txs| {
                txs.iter()
                    .filter(|tx| from.is_none_or(|from| tx.posted_at >= from) && tx.posted_at < to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Stable sort keeps append order for equal timestamps.
        matching.sort_by_key(|tx| tx.posted_at);
        Ok(matching)
    }

    async fn get_posted_transaction_by_number(
        &self,
        company_id: &CompanyId,
        transaction_number: &str,
    ) -> Result<Option<Transaction>, LedgerStoreError> {
        Ok(self.transactions.get(company_id).and_then(|txs| {
            txs.iter()
                .find(|tx| tx.transaction_number == transaction_number)
                .cloned()
        }))
    }

    async fn commit_append_only(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, LedgerStoreError> {
        validate_posting(&transaction)?;

        if let Some(guard) = &self.period_guard {
            ensure_posting_allowed(
                guard.as_ref(),
                &transaction.company_id,
                transaction.posted_at.date_naive(),
            )
            .await?;
        }

        let id = Self::transaction_id(&transaction.company_id, &transaction.transaction_number);
        let mut company_txs = self
            .transactions
            .entry(transaction.company_id.clone())
            .or_default();

        if company_txs
            .iter()
            .any(|tx| tx.transaction_number == transaction.transaction_number)
        {
            return Err(LedgerStoreError::DuplicateTransactionNumber(
                transaction.transaction_number,
            ));
        }

        let posted = transaction.into_posted(id);
        company_txs.push(posted.clone());
        tracing::debug!(
            company_id = %posted.company_id,
            transaction_number = %posted.transaction_number,
            lines = posted.lines.len(),
            "transaction appended"
        );
        Ok(posted)
    }
}

/// A read-only fixture: reads like [`InMemoryLedgerStore`], refuses every write.
#[derive(Default)]
pub struct ReadOnlyLedgerStore {
    inner: InMemoryLedgerStore,
}

impl ReadOnlyLedgerStore {
    /// Creates a read-only store over already-posted transactions.
    #[must_use]
    pub fn new(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        Self {
            inner: InMemoryLedgerStore::with_transactions(transactions),
        }
    }
}

#[async_trait]
impl LedgerStore for ReadOnlyLedgerStore {
    async fn list_posted_transactions(
        &self,
        company_id: &CompanyId,
        from: Option<DateTime<Utc>>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        self.inner.list_posted_transactions(company_id, from, to).await
    }

    async fn get_posted_transaction_by_number(
        &self,
        company_id: &CompanyId,
        transaction_number: &str,
    ) -> Result<Option<Transaction>, LedgerStoreError> {
        self.inner
            .get_posted_transaction_by_number(company_id, transaction_number)
            .await
    }

    async fn commit_append_only(
        &self,
        _transaction: NewTransaction,
    ) -> Result<Transaction, LedgerStoreError> {
        Err(LedgerStoreError::NotSupported("commit_append_only"))
    }
}
