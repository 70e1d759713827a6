//! Audit evidence bundle builder.

use crate::canonical::{Clock, digest_of, iso_millis, stable_id};
use crate::fiscal::PeriodLockState;
use crate::ledger::LedgerStore;
use crate::reports::{ReportError, ReportService};
use crate::retention::{LegalHoldChecker, RetentionPolicy, RetentionService};

use super::error::EvidenceError;
use super::types::{
    AUDIT_EVIDENCE_SCHEMA_VERSION, AdmissionEvidence, AuditEvidenceBase, AuditEvidenceBundle,
    CORRELATION_ID_NAMESPACE, EVIDENCE_ID_NAMESPACE, EvidenceRequest, LedgerEvidence,
    RetentionEvidence,
};

/// Collaborators an evidence build reads from.
#[derive(Clone, Copy)]
pub struct EvidenceDependencies<'a> {
    /// Posted transactions.
    pub ledger: &'a dyn LedgerStore,
    /// Period lock state.
    pub periods: &'a dyn PeriodLockState,
    /// Legal hold registry; `None` makes every retention decision fail safe.
    pub legal_hold: Option<&'a dyn LegalHoldChecker>,
    /// Retention periods.
    pub retention_policy: &'a RetentionPolicy,
    /// Source of `created_at` and the retention evaluation instant.
    pub clock: Clock,
}

/// Service for building audit evidence bundles.
pub struct EvidenceService;

impl EvidenceService {
    /// Builds and signs the evidence bundle for `request`.
    ///
    /// The period lookup, trial balance and retention evaluation run
    /// concurrently and are not read from a common snapshot. Any failure
    /// aborts the build.
    ///
    /// # Errors
    ///
    /// Returns `EvidenceError` if the range is invalid or any collaborator fails.
    #[tracing::instrument(
        skip(deps, request),
        fields(
            tenant_id = %request.tenant_id,
            company_id = %request.company_id,
            request_id = %request.request_id,
        )
    )]
    pub async fn build_audit_evidence_bundle(
        deps: EvidenceDependencies<'_>,
        request: EvidenceRequest,
    ) -> Result<AuditEvidenceBundle, EvidenceError> {
        if request.from > request.to {
            return Err(ReportError::InvalidDateRange {
                from: request.from,
                to: request.to,
            }
            .into());
        }

        let now = deps.clock.now();
        let correlation_id = Self::correlation_id(&request);

        let period = async {
            deps.periods
                .get_period_state_for_date(&request.company_id, request.to.date_naive())
                .await
                .map_err(EvidenceError::from)
        };
        let trial_balance = async {
            ReportService::build_trial_balance(
                deps.ledger,
                &request.company_id,
                request.from,
                request.to,
            )
            .await
            .map_err(EvidenceError::from)
        };
        let retention = async {
            Ok::<_, EvidenceError>(
                RetentionService::evaluate(
                    deps.retention_policy,
                    deps.legal_hold,
                    &request.tenant_id,
                    request.retention_data_type,
                    now,
                    now,
                )
                .await,
            )
        };
        let (period, trial_balance, retention) =
            tokio::try_join!(period, trial_balance, retention)?;

        let base = AuditEvidenceBase {
            schema_version: AUDIT_EVIDENCE_SCHEMA_VERSION.to_string(),
            bundle_id: Self::bundle_id(&request),
            correlation_id,
            created_at: now,
            tenant_id: request.tenant_id,
            actor_id: request.actor_id,
            request_id: request.request_id,
            company_id: request.company_id,
            from: request.from,
            to: request.to,
            admission: AdmissionEvidence {
                decision: request.admission_decision,
                reason: request.admission_reason,
            },
            ledger: LedgerEvidence {
                trial_balance_hash: trial_balance.integrity_hash,
                account_count: trial_balance.rows.len(),
                balanced: trial_balance.totals.is_balanced,
                period,
            },
            retention: RetentionEvidence {
                data_type: request.retention_data_type,
                policy_days: deps.retention_policy.days_for(request.retention_data_type),
                evaluation: retention,
            },
        };
        let integrity_hash = digest_of(&base)?;

        tracing::info!(
            bundle_id = %base.bundle_id,
            integrity_hash = %integrity_hash,
            "audit evidence bundle built"
        );

        Ok(AuditEvidenceBundle {
            base,
            integrity_hash,
        })
    }

    /// Deterministic bundle id over tenant, company, request and range.
    #[must_use]
    pub fn bundle_id(request: &EvidenceRequest) -> String {
        let seed = format!(
            "{}:{}:{}:{}:{}",
            request.tenant_id,
            request.company_id,
            request.request_id,
            iso_millis(&request.from),
            iso_millis(&request.to),
        );
        stable_id(EVIDENCE_ID_NAMESPACE, &seed)
    }

    /// Deterministic correlation id over request and tenant.
    #[must_use]
    pub fn correlation_id(request: &EvidenceRequest) -> String {
        stable_id(
            CORRELATION_ID_NAMESPACE,
            &format!("{}:{}", request.request_id, request.tenant_id),
        )
    }
}
