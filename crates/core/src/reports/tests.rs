//! Tests for the trial balance builder.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use tally_shared::types::{Cents, CompanyId, TransactionId};

use super::error::ReportError;
use super::service::ReportService;
use super::types::TRIAL_BALANCE_SCHEMA_VERSION;
use crate::canonical::{Attested, canonicalize, verify_integrity};
use crate::ledger::{
    InMemoryLedgerStore, LedgerLine, LedgerStore, LedgerStoreError, NewTransaction, Transaction,
};

fn company() -> CompanyId {
    CompanyId::from("co-1")
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
}

fn posted(number: &str, at: DateTime<Utc>, lines: Vec<LedgerLine>) -> Transaction {
    Transaction {
        id: TransactionId::new(format!("txn-{number}")),
        company_id: company(),
        transaction_number: number.to_string(),
        posted_at: at,
        lines,
    }
}

fn transfer(number: &str, at: DateTime<Utc>, debit: &str, credit: &str, amount: &str) -> Transaction {
    posted(
        number,
        at,
        vec![LedgerLine::debit(debit, amount), LedgerLine::credit(credit, amount)],
    )
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

struct FailingStore;

#[async_trait]
impl LedgerStore for FailingStore {
    async fn list_posted_transactions(
        &self,
        _company_id: &CompanyId,
        _from: Option<DateTime<Utc>>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        Err(LedgerStoreError::Unavailable("connection refused".to_string()))
    }

    async fn get_posted_transaction_by_number(
        &self,
        _company_id: &CompanyId,
        _transaction_number: &str,
    ) -> Result<Option<Transaction>, LedgerStoreError> {
        Err(LedgerStoreError::Unavailable("connection refused".to_string()))
    }

    async fn commit_append_only(
        &self,
        _transaction: NewTransaction,
    ) -> Result<Transaction, LedgerStoreError> {
        Err(LedgerStoreError::NotSupported("commit_append_only"))
    }
}

#[tokio::test]
async fn test_opening_activity_closing_split() {
    let store = InMemoryLedgerStore::with_transactions([
        transfer("JE-1", day(1), "1000", "3000", "100.00"),
        transfer("JE-2", day(10), "5000", "1000", "25.50"),
        // Exactly at `to`: excluded.
        transfer("JE-3", day(20), "5000", "1000", "99.99"),
    ]);

    let tb = ReportService::build_trial_balance(&store, &company(), day(10), day(20))
        .await
        .unwrap();

    let accounts: Vec<&str> = tb.rows.iter().map(|r| r.account_id.as_str()).collect();
    assert_eq!(accounts, vec!["1000", "3000", "5000"]);

    let cash = &tb.rows[0];
    assert_eq!(cash.opening_cents, Cents::new(10_000));
    assert_eq!(cash.activity_cents, Cents::new(-2_550));
    assert_eq!(cash.closing_cents, Cents::new(7_450));

    let equity = &tb.rows[1];
    assert_eq!(equity.opening_cents, Cents::new(-10_000));
    assert_eq!(equity.activity_cents, Cents::ZERO);

    let expense = &tb.rows[2];
    assert_eq!(expense.opening_cents, Cents::ZERO);
    assert_eq!(expense.closing_cents, Cents::new(2_550));

    assert!(tb.totals.is_balanced);
    assert_eq!(tb.totals.closing_cents, Cents::ZERO);
    assert_eq!(tb.currency, "USD");
}

#[tokio::test]
async fn test_zero_net_account_is_omitted() {
    let store = InMemoryLedgerStore::with_transactions([
        transfer("JE-1", day(2), "1000", "3000", "10.00"),
        posted(
            "JE-2",
            day(5),
            vec![LedgerLine::debit("9000", "4.00"), LedgerLine::credit("9000", "4.00")],
        ),
    ]);

    let tb = ReportService::build_trial_balance(&store, &company(), day(1), day(31))
        .await
        .unwrap();

    let accounts: Vec<&str> = tb.rows.iter().map(|r| r.account_id.as_str()).collect();
    assert_eq!(accounts, vec!["1000", "3000"]);

    let without_suspense = InMemoryLedgerStore::with_transactions([transfer(
        "JE-1",
        day(2),
        "1000",
        "3000",
        "10.00",
    )]);
    let baseline = ReportService::build_trial_balance(&without_suspense, &company(), day(1), day(31))
        .await
        .unwrap();
    assert_eq!(tb.integrity_hash, baseline.integrity_hash);
}

#[tokio::test]
async fn test_transaction_at_from_counts_as_activity() {
    let store = InMemoryLedgerStore::with_transactions([transfer(
        "JE-1",
        day(10),
        "1000",
        "3000",
        "1.00",
    )]);
    let tb = ReportService::build_trial_balance(&store, &company(), day(10), day(11))
        .await
        .unwrap();
    assert_eq!(tb.rows[0].opening_cents, Cents::ZERO);
    assert_eq!(tb.rows[0].activity_cents, Cents::new(100));
}

#[tokio::test]
async fn test_empty_ledger_has_reproducible_hash() {
    let store = InMemoryLedgerStore::new();
    let first = ReportService::build_trial_balance(&store, &company(), day(1), day(31))
        .await
        .unwrap();
    let second = ReportService::build_trial_balance(&store, &company(), day(1), day(31))
        .await
        .unwrap();

    assert!(first.rows.is_empty());
    assert_eq!(first.integrity_hash.len(), 64);
    assert_eq!(first.integrity_hash, second.integrity_hash);
    assert!(first.totals.is_balanced);
}

#[tokio::test]
async fn test_hash_depends_on_range_and_company() {
    let store = InMemoryLedgerStore::new();
    let base = ReportService::build_trial_balance(&store, &company(), day(1), day(31))
        .await
        .unwrap();
    let shifted = ReportService::build_trial_balance(&store, &company(), day(2), day(31))
        .await
        .unwrap();
    let other = ReportService::build_trial_balance(&store, &CompanyId::from("co-2"), day(1), day(31))
        .await
        .unwrap();

    assert_ne!(base.integrity_hash, shifted.integrity_hash);
    assert_ne!(base.integrity_hash, other.integrity_hash);
}

#[tokio::test]
async fn test_canonical_form_uses_decimal_strings() {
    let store = InMemoryLedgerStore::with_transactions([transfer(
        "JE-1",
        day(1),
        "1000",
        "3000",
        "123.45",
    )]);
    let tb = ReportService::build_trial_balance(&store, &company(), day(5), day(6))
        .await
        .unwrap();

    let canonical = canonicalize(&tb.canonical()).unwrap();
    assert!(canonical.starts_with(&format!(
        r#"{{"schema_version":"{TRIAL_BALANCE_SCHEMA_VERSION}","company_id":"co-1","from":"2024-03-05T00:00:00.000Z""#
    )));
    assert!(canonical.contains(r#""opening":"-123.45""#));
    assert!(canonical.contains(r#""activity":"0.00""#));
    assert!(verify_integrity(&tb).unwrap());
}

#[tokio::test]
async fn test_tampered_row_fails_verification() {
    let store = InMemoryLedgerStore::with_transactions([transfer(
        "JE-1",
        day(1),
        "1000",
        "3000",
        "10.00",
    )]);
    let mut tb = ReportService::build_trial_balance(&store, &company(), day(1), day(2))
        .await
        .unwrap();
    tb.rows[0].closing_cents = Cents::new(1);
    assert!(!verify_integrity(&tb).unwrap());
}

#[tokio::test]
async fn test_invalid_range_rejected_before_fetch() {
    let err = ReportService::build_trial_balance(&FailingStore, &company(), day(2), day(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::InvalidDateRange { .. }));
    assert_eq!(err.error_code(), "INVALID_DATE_RANGE");
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let err = ReportService::build_trial_balance(&FailingStore, &company(), day(1), day(2))
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Store(LedgerStoreError::Unavailable(_))));
    assert_eq!(err.error_code(), "LEDGER_STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_malformed_stored_amount_propagates() {
    let store = InMemoryLedgerStore::with_transactions([posted(
        "JE-1",
        day(1),
        vec![LedgerLine::debit("1000", "1.2.3")],
    )]);
    let err = ReportService::build_trial_balance(&store, &company(), day(1), day(2))
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::Money(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any ledger, closing = opening + activity on every row, rows are
    /// strictly ascending by account id, no row is all-zero, and the closing
    /// total is zero.
    #[test]
    fn prop_closing_is_opening_plus_activity(
        postings in prop::collection::vec((0u32..5, 0u32..5, 1i64..1_000_000, 0i64..60), 0..30),
        from_offset in 0i64..60,
        span in 0i64..30,
    ) {
        let origin = day(1);
        let transactions: Vec<Transaction> = postings
            .iter()
            .enumerate()
            .map(|(i, (debit, credit, cents, offset))| {
                transfer(
                    &format!("JE-{i}"),
                    origin + Duration::days(*offset),
                    &format!("{}", 1000 + debit),
                    &format!("{}", 2000 + credit),
                    &Cents::new(*cents).to_decimal_string(),
                )
            })
            .collect();
        let store = InMemoryLedgerStore::with_transactions(transactions);
        let from = origin + Duration::days(from_offset);
        let to = from + Duration::days(span);

        let tb = block_on(ReportService::build_trial_balance(&store, &company(), from, to)).unwrap();

        for row in &tb.rows {
            prop_assert_eq!(
                row.closing_cents.value(),
                row.opening_cents.value() + row.activity_cents.value()
            );
            prop_assert!(!(row.opening_cents.is_zero() && row.activity_cents.is_zero()));
        }
        for pair in tb.rows.windows(2) {
            prop_assert!(pair[0].account_id < pair[1].account_id);
        }
        prop_assert!(tb.totals.is_balanced);
        prop_assert!(verify_integrity(&tb).unwrap());
    }
}
