//! Evidence bundle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{ActorId, CompanyId, RequestId, TenantId};

use crate::canonical::Attested;
use crate::canonical::serde_fmt::iso_millis_format;
use crate::fiscal::PeriodState;
use crate::retention::{RetentionDataType, RetentionEvaluation};

/// Version tag of the audit evidence canonical field list.
pub const AUDIT_EVIDENCE_SCHEMA_VERSION: &str = "audit_evidence.v1";

/// Namespace of bundle ids.
pub const EVIDENCE_ID_NAMESPACE: &str = "evidence";

/// Namespace of correlation ids.
pub const CORRELATION_ID_NAMESPACE: &str = "corr";

/// Upstream admission verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdmissionDecision {
    /// The request was admitted.
    Accepted,
    /// The request was turned away.
    Rejected,
}

/// Input of one evidence build.
#[derive(Debug, Clone)]
pub struct EvidenceRequest {
    /// Tenant owning the company.
    pub tenant_id: TenantId,
    /// Who asked for the evidence.
    pub actor_id: ActorId,
    /// Upstream request id.
    pub request_id: RequestId,
    /// Company whose ledger is attested.
    pub company_id: CompanyId,
    /// Inclusive range start.
    pub from: DateTime<Utc>,
    /// Exclusive range end.
    pub to: DateTime<Utc>,
    /// Admission verdict, if one was made.
    pub admission_decision: Option<AdmissionDecision>,
    /// Free-form admission reason.
    pub admission_reason: Option<String>,
    /// Data class the bundle is retained as.
    pub retention_data_type: RetentionDataType,
}

/// Admission section of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionEvidence {
    /// Verdict, `null` when none was made.
    pub decision: Option<AdmissionDecision>,
    /// Reason, `null` when none was given.
    pub reason: Option<String>,
}

/// Ledger section of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvidence {
    /// Integrity hash of the trial balance over the requested range.
    pub trial_balance_hash: String,
    /// Number of trial balance rows.
    pub account_count: usize,
    /// Whether closing balances net to zero.
    pub balanced: bool,
    /// Period state at the range end date.
    pub period: PeriodState,
}

/// Retention section of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionEvidence {
    /// Data class evaluated.
    pub data_type: RetentionDataType,
    /// Policy period applied.
    pub policy_days: u32,
    /// The decision.
    #[serde(flatten)]
    pub evaluation: RetentionEvaluation,
}

/// Everything in a bundle except its integrity hash, in canonical field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvidenceBase {
    /// Canonical field list version.
    pub schema_version: String,
    /// Deterministic bundle id.
    pub bundle_id: String,
    /// Correlation id derived from request and tenant.
    pub correlation_id: String,
    /// Build time per the injected clock.
    #[serde(with = "iso_millis_format")]
    pub created_at: DateTime<Utc>,
    /// Tenant.
    pub tenant_id: TenantId,
    /// Actor.
    pub actor_id: ActorId,
    /// Request.
    pub request_id: RequestId,
    /// Company.
    pub company_id: CompanyId,
    /// Inclusive range start.
    #[serde(with = "iso_millis_format")]
    pub from: DateTime<Utc>,
    /// Exclusive range end.
    #[serde(with = "iso_millis_format")]
    pub to: DateTime<Utc>,
    /// Admission section.
    pub admission: AdmissionEvidence,
    /// Ledger section.
    pub ledger: LedgerEvidence,
    /// Retention section.
    pub retention: RetentionEvidence,
}

/// A signed audit evidence bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvidenceBundle {
    /// Hashed content.
    #[serde(flatten)]
    pub base: AuditEvidenceBase,
    /// Digest of the canonical `base`.
    pub integrity_hash: String,
}

impl Attested for AuditEvidenceBundle {
    type Canonical<'a> = &'a AuditEvidenceBase;

    fn canonical(&self) -> &AuditEvidenceBase {
        &self.base
    }

    fn integrity_hash(&self) -> &str {
        &self.integrity_hash
    }
}
