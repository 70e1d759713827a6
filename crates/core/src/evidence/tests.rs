//! Tests for the evidence bundle builder.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tally_shared::types::{CompanyId, PeriodId, TenantId, TransactionId};

use super::error::EvidenceError;
use super::service::{EvidenceDependencies, EvidenceService};
use super::types::{AdmissionDecision, AuditEvidenceBundle, EvidenceRequest};
use crate::canonical::{Clock, verify_integrity};
use crate::fiscal::{
    InMemoryPeriodLockState, PeriodLockError, PeriodLockState, PeriodLockStatus, PeriodState,
};
use crate::ledger::{
    InMemoryLedgerStore, LedgerLine, LedgerStore, LedgerStoreError, NewTransaction, Transaction,
};
use crate::reports::{ReportError, ReportService};
use crate::retention::{
    LegalHoldChecker, LegalHoldError, RetentionDataType, RetentionPolicy, RetentionReason,
};

fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap()
}

fn request() -> EvidenceRequest {
    EvidenceRequest {
        tenant_id: "tenant-1".into(),
        actor_id: "user-7".into(),
        request_id: "req-42".into(),
        company_id: "co-1".into(),
        from: at(1, 1),
        to: at(2, 1),
        admission_decision: None,
        admission_reason: None,
        retention_data_type: RetentionDataType::AuditLogs,
    }
}

fn ledger() -> InMemoryLedgerStore {
    let line_set = |amount: &str| vec![LedgerLine::debit("1000", amount), LedgerLine::credit("4000", amount)];
    InMemoryLedgerStore::with_transactions([
        Transaction {
            id: TransactionId::from("t1"),
            company_id: CompanyId::from("co-1"),
            transaction_number: "JE-1".to_string(),
            posted_at: Utc.with_ymd_and_hms(2023, 12, 15, 0, 0, 0).unwrap(),
            lines: line_set("500.00"),
        },
        Transaction {
            id: TransactionId::from("t2"),
            company_id: CompanyId::from("co-1"),
            transaction_number: "JE-2".to_string(),
            posted_at: at(1, 15),
            lines: line_set("75.25"),
        },
    ])
}

fn locked_february() -> InMemoryPeriodLockState {
    let periods = InMemoryPeriodLockState::new();
    periods.lock(
        CompanyId::from("co-1"),
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        PeriodId::from("2024-02"),
    );
    periods
}

struct NoHold;

#[async_trait]
impl LegalHoldChecker for NoHold {
    async fn is_under_legal_hold(
        &self,
        _tenant_id: &TenantId,
        _data_type: RetentionDataType,
    ) -> Result<bool, LegalHoldError> {
        Ok(false)
    }
}

struct BrokenPeriods;

#[async_trait]
impl PeriodLockState for BrokenPeriods {
    async fn get_period_state_for_date(
        &self,
        _company_id: &CompanyId,
        _date: NaiveDate,
    ) -> Result<PeriodState, PeriodLockError> {
        Err(PeriodLockError::Unavailable("timeout".to_string()))
    }
}

struct UnreachableLedger;

#[async_trait]
impl LedgerStore for UnreachableLedger {
    async fn list_posted_transactions(
        &self,
        _company_id: &CompanyId,
        _from: Option<DateTime<Utc>>,
        _to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        Err(LedgerStoreError::Unavailable("connection reset".to_string()))
    }

    async fn get_posted_transaction_by_number(
        &self,
        _company_id: &CompanyId,
        _transaction_number: &str,
    ) -> Result<Option<Transaction>, LedgerStoreError> {
        Err(LedgerStoreError::Unavailable("connection reset".to_string()))
    }

    async fn commit_append_only(
        &self,
        _transaction: NewTransaction,
    ) -> Result<Transaction, LedgerStoreError> {
        Err(LedgerStoreError::NotSupported("commit_append_only"))
    }
}

async fn build(
    ledger: &dyn LedgerStore,
    periods: &dyn PeriodLockState,
    legal_hold: Option<&dyn LegalHoldChecker>,
    request: EvidenceRequest,
) -> Result<AuditEvidenceBundle, EvidenceError> {
    let policy = RetentionPolicy::default();
    let deps = EvidenceDependencies {
        ledger,
        periods,
        legal_hold,
        retention_policy: &policy,
        clock: Clock::deterministic(),
    };
    EvidenceService::build_audit_evidence_bundle(deps, request).await
}

#[tokio::test]
async fn test_replay_is_byte_identical() {
    let store = ledger();
    let periods = locked_february();

    let first = build(&store, &periods, None, request()).await.unwrap();
    let second = build(&store, &periods, None, request()).await.unwrap();

    assert_eq!(first.integrity_hash, second.integrity_hash);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.base.created_at, DateTime::<Utc>::UNIX_EPOCH);
    assert!(first.base.bundle_id.starts_with("evidence_"));
    assert!(first.base.correlation_id.starts_with("corr_"));
}

#[tokio::test]
async fn test_request_id_changes_identity() {
    let store = ledger();
    let periods = locked_february();
    let mut other = request();
    other.request_id = "req-43".into();

    let first = build(&store, &periods, None, request()).await.unwrap();
    let second = build(&store, &periods, None, other).await.unwrap();

    assert_ne!(first.base.bundle_id, second.base.bundle_id);
    assert_ne!(first.base.correlation_id, second.base.correlation_id);
    assert_ne!(first.integrity_hash, second.integrity_hash);
    assert_eq!(
        first.base.ledger.trial_balance_hash,
        second.base.ledger.trial_balance_hash
    );
}

#[tokio::test]
async fn test_ledger_section_matches_trial_balance() {
    let store = ledger();
    let periods = locked_february();
    let bundle = build(&store, &periods, None, request()).await.unwrap();

    let tb = ReportService::build_trial_balance(&store, &CompanyId::from("co-1"), at(1, 1), at(2, 1))
        .await
        .unwrap();
    assert_eq!(bundle.base.ledger.trial_balance_hash, tb.integrity_hash);
    assert_eq!(bundle.base.ledger.account_count, 2);
    assert!(bundle.base.ledger.balanced);

    // Period state is read for the `to` date.
    assert_eq!(bundle.base.ledger.period.state, PeriodLockStatus::Locked);
    assert_eq!(
        bundle.base.ledger.period.period_id,
        Some(PeriodId::from("2024-02"))
    );
}

#[tokio::test]
async fn test_unknown_period_defaults_to_open() {
    let store = ledger();
    let bundle = build(&store, &InMemoryPeriodLockState::new(), None, request())
        .await
        .unwrap();
    assert_eq!(bundle.base.ledger.period, PeriodState::unknown());
}

#[tokio::test]
async fn test_retention_section() {
    let store = ledger();
    let periods = locked_february();

    let fail_safe = build(&store, &periods, None, request()).await.unwrap();
    assert!(fail_safe.base.retention.evaluation.retain);
    assert!(fail_safe.base.retention.evaluation.legal_hold);
    assert_eq!(
        fail_safe.base.retention.evaluation.reason,
        RetentionReason::LegalHoldUnknownFailSafe
    );
    assert_eq!(fail_safe.base.retention.policy_days, 2555);

    let checked = build(&store, &periods, Some(&NoHold), request()).await.unwrap();
    assert_eq!(
        checked.base.retention.evaluation.reason,
        RetentionReason::WithinRetentionWindow
    );
    assert_ne!(fail_safe.integrity_hash, checked.integrity_hash);
}

#[tokio::test]
async fn test_json_shape_and_integrity() {
    let store = ledger();
    let periods = locked_february();
    let mut req = request();
    req.admission_decision = Some(AdmissionDecision::Accepted);
    req.admission_reason = Some("within capacity".to_string());

    let bundle = build(&store, &periods, None, req).await.unwrap();
    let json = serde_json::to_string(&bundle).unwrap();

    assert!(json.starts_with(r#"{"schema_version":"audit_evidence.v1","bundle_id":"evidence_"#));
    assert!(json.contains(r#""created_at":"1970-01-01T00:00:00.000Z""#));
    assert!(json.contains(r#""admission":{"decision":"ACCEPTED","reason":"within capacity"}"#));
    assert!(json.contains(r#""period":{"period_id":"2024-02","state":"LOCKED"}"#));
    assert!(json.ends_with(&format!(r#""integrity_hash":"{}"}}"#, bundle.integrity_hash)));

    let parsed: AuditEvidenceBundle = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, bundle);
    assert!(verify_integrity(&parsed).unwrap());
}

#[tokio::test]
async fn test_missing_admission_serializes_as_null() {
    let store = ledger();
    let bundle = build(&store, &locked_february(), None, request()).await.unwrap();
    let json = serde_json::to_string(&bundle).unwrap();
    assert!(json.contains(r#""admission":{"decision":null,"reason":null}"#));
}

#[tokio::test]
async fn test_tampering_is_detected() {
    let store = ledger();
    let mut bundle = build(&store, &locked_february(), None, request()).await.unwrap();
    bundle.base.actor_id = "someone-else".into();
    assert!(!verify_integrity(&bundle).unwrap());
}

#[tokio::test]
async fn test_period_failure_aborts_build() {
    let store = ledger();
    let err = build(&store, &BrokenPeriods, None, request()).await.unwrap_err();
    assert!(matches!(err, EvidenceError::PeriodLock(_)));
    assert_eq!(err.error_code(), "PERIOD_LOCK_UNAVAILABLE");
}

#[tokio::test]
async fn test_ledger_failure_aborts_build() {
    let err = build(&UnreachableLedger, &locked_february(), Some(&NoHold), request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EvidenceError::Report(ReportError::Store(LedgerStoreError::Unavailable(_)))
    ));
    assert_eq!(err.error_code(), "LEDGER_STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_invalid_range_rejected() {
    let store = ledger();
    let mut req = request();
    req.from = at(3, 1);
    let err = build(&store, &locked_february(), None, req).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_DATE_RANGE");
}

#[test]
fn test_bundle_id_seed_covers_range() {
    let mut shifted = request();
    shifted.to = at(2, 2);
    assert_ne!(
        EvidenceService::bundle_id(&request()),
        EvidenceService::bundle_id(&shifted)
    );
    assert_eq!(
        EvidenceService::bundle_id(&request()),
        EvidenceService::bundle_id(&request())
    );
}
