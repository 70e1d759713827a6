//! Read-only ledger store over the `transactions` and `ledger_entries` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement, Value};
use tally_core::ledger::{LedgerLine, LedgerStore, LedgerStoreError, NewTransaction, Transaction};
use tally_shared::types::{AccountId, Cents, CompanyId, MoneyError, TransactionId};
use uuid::Uuid;

const SELECT_POSTED_LINES: &str = r"
SELECT
    t.id::text AS transaction_id,
    t.organization_id::text AS company_id,
    COALESCE(t.reference_number, t.id::text) AS transaction_number,
    t.posted_at AS posted_at,
    e.account_id::text AS account_id,
    e.debit AS debit,
    e.credit AS credit
FROM transactions t
JOIN ledger_entries e ON e.transaction_id = t.id
WHERE t.organization_id = $1
  AND t.status IN ('posted', 'voided')
  AND t.posted_at IS NOT NULL";

/// One ledger entry joined with its transaction header.
#[derive(Debug, Clone, FromQueryResult)]
pub struct PostedLineRow {
    /// Transaction id.
    pub transaction_id: String,
    /// Owning organization.
    pub company_id: String,
    /// Reference number, or the id when none was assigned.
    pub transaction_number: String,
    /// Posting time.
    pub posted_at: DateTime<Utc>,
    /// Account id.
    pub account_id: String,
    /// Debit amount, zero on credit lines.
    pub debit: Decimal,
    /// Credit amount, zero on debit lines.
    pub credit: Decimal,
}

/// Ledger store backed by Postgres.
///
/// Voided transactions stay in the listing: they were posted and their
/// reversals are posted too, so together they net out.
/// Writes go through the posting workflow, never through this store.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    db: DatabaseConnection,
}

impl PgLedgerStore {
    /// Creates a new ledger store.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch(&self, sql: String, values: Vec<Value>) -> Result<Vec<Transaction>, LedgerStoreError> {
        let rows = PostedLineRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            values,
        ))
        .all(&self.db)
        .await
        .map_err(unavailable)?;

        Ok(group_rows(rows)?)
    }
}

fn unavailable(err: DbErr) -> LedgerStoreError {
    tracing::warn!(error = %err, "ledger query failed");
    LedgerStoreError::Unavailable(err.to_string())
}

/// Company ids in this schema are organization UUIDs; anything else names no company.
fn organization_id(company_id: &CompanyId) -> Option<Uuid> {
    Uuid::parse_str(company_id.as_str()).ok()
}

fn amount(value: Decimal) -> Result<Option<String>, MoneyError> {
    let cents = Cents::from_decimal(value)?;
    Ok((!cents.is_zero()).then(|| cents.to_decimal_string()))
}

/// Folds rows, ordered by transaction, into transactions with their lines.
///
/// Consecutive rows with the same transaction id belong to one transaction.
/// Amounts are rescaled from `NUMERIC(19,4)` to cents; sub-cent values are
/// rejected rather than rounded.
pub fn group_rows(rows: Vec<PostedLineRow>) -> Result<Vec<Transaction>, MoneyError> {
    let mut transactions: Vec<Transaction> = Vec::new();

    for row in rows {
        let line = LedgerLine {
            account_id: AccountId::new(row.account_id),
            debit: amount(row.debit)?,
            credit: amount(row.credit)?,
        };

        match transactions.last_mut() {
            Some(current) if current.id.as_str() == row.transaction_id => current.lines.push(line),
            _ => transactions.push(Transaction {
                id: TransactionId::new(row.transaction_id),
                company_id: CompanyId::new(row.company_id),
                transaction_number: row.transaction_number,
                posted_at: row.posted_at,
                lines: vec![line],
            }),
        }
    }

    Ok(transactions)
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn list_posted_transactions(
        &self,
        company_id: &CompanyId,
        from: Option<DateTime<Utc>>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        let Some(organization_id) = organization_id(company_id) else {
            return Ok(Vec::new());
        };

        let mut sql = format!("{SELECT_POSTED_LINES}\n  AND t.posted_at < $2");
        let mut values: Vec<Value> = vec![organization_id.into(), to.into()];
        if let Some(from) = from {
            sql.push_str("\n  AND t.posted_at >= $3");
            values.push(from.into());
        }
        sql.push_str("\nORDER BY t.posted_at, t.id, e.created_at, e.id");

        self.fetch(sql, values).await
    }

    async fn get_posted_transaction_by_number(
        &self,
        company_id: &CompanyId,
        transaction_number: &str,
    ) -> Result<Option<Transaction>, LedgerStoreError> {
        let Some(organization_id) = organization_id(company_id) else {
            return Ok(None);
        };

        let sql = format!(
            "{SELECT_POSTED_LINES}\n  AND t.reference_number = $2\nORDER BY e.created_at, e.id"
        );
        let values: Vec<Value> = vec![organization_id.into(), transaction_number.into()];

        Ok(self.fetch(sql, values).await?.into_iter().next())
    }

    async fn commit_append_only(
        &self,
        _transaction: NewTransaction,
    ) -> Result<Transaction, LedgerStoreError> {
        Err(LedgerStoreError::NotSupported("commit_append_only"))
    }
}
