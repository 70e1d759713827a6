//! Tally attestor.
//!
//! Loads configuration, wires the Postgres adapters when a database is
//! configured, and prints a compliance snapshot (plus an audit evidence bundle
//! when an attestation target is configured) as JSON on stdout.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::canonical::{Clock, iso_millis, stable_id};
use tally_core::compliance::{
    ComplianceService, ComplianceSnapshot, LedgerReadinessGates, ProcessEnvironment,
    ReadinessGateRunner, SnapshotDependencies, SnapshotOptions, StaticPermissionRegistry, global,
};
use tally_core::evidence::{
    AuditEvidenceBundle, EvidenceDependencies, EvidenceRequest, EvidenceService,
};
use tally_core::ledger::LedgerStore;
use tally_core::retention::{RetentionDataType, RetentionPolicy};
use tally_db::{PgLedgerStore, PgPeriodLockState, connect};
use tally_shared::config::AttestTargetConfig;
use tally_shared::types::{CompanyId, RequestId};
use tally_shared::AppConfig;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "tally=debug,attestor=info";

#[derive(Serialize)]
struct AttestationOutput<'a> {
    compliance_snapshot: &'a ComplianceSnapshot,
    audit_evidence: Option<&'a AuditEvidenceBundle>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(config.logging.json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.logging.json).then(tracing_subscriber::fmt::layer))
        .init();

    let clock = Clock::from_runtime(&config.runtime);
    let control_plane = global();
    control_plane.set_capacity(config.capacity.clone());

    let (ledger, periods) = match &config.database {
        Some(database) => {
            let db = connect(database).await?;
            info!("Connected to database");
            (
                Some(PgLedgerStore::new(db.clone())),
                Some(PgPeriodLockState::new(db)),
            )
        }
        None => {
            warn!("No database configured; readiness gates and evidence are skipped");
            (None, None)
        }
    };

    let gates = LedgerReadinessGates::new(
        config
            .attest
            .iter()
            .map(|target| CompanyId::from(target.company_id.as_str()))
            .collect(),
        clock,
    );
    let environment = ProcessEnvironment::from_runtime(&config.runtime, &clock);
    let permissions = permission_registry();

    let snapshot = ComplianceService::build_compliance_snapshot(
        SnapshotDependencies {
            environment: &environment,
            permissions: &permissions,
            control_plane,
            readiness: Some(&gates as &dyn ReadinessGateRunner),
            store: ledger.as_ref().map(|store| store as &dyn LedgerStore),
            clock,
        },
        SnapshotOptions {
            include_readiness: true,
        },
    )
    .await?;

    let evidence = match (&config.attest, &ledger, &periods) {
        (Some(target), Some(ledger), Some(periods)) => {
            let retention_policy = RetentionPolicy::with_overrides(&config.retention);
            let deps = EvidenceDependencies {
                ledger,
                periods,
                legal_hold: None,
                retention_policy: &retention_policy,
                clock,
            };
            Some(EvidenceService::build_audit_evidence_bundle(deps, evidence_request(target)?).await?)
        }
        _ => None,
    };

    let output = AttestationOutput {
        compliance_snapshot: &snapshot,
        audit_evidence: evidence.as_ref(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Roles the attestation surface knows about.
fn permission_registry() -> StaticPermissionRegistry {
    StaticPermissionRegistry::new()
        .with_role("owner", ["ledger:read", "ledger:write", "evidence:export", "control_plane:write"])
        .with_role("accountant", ["ledger:read", "ledger:write"])
        .with_role("auditor", ["ledger:read", "evidence:export"])
        .with_role("viewer", ["ledger:read"])
}

fn evidence_request(target: &AttestTargetConfig) -> anyhow::Result<EvidenceRequest> {
    let from = parse_instant(&target.from).context("attest.from")?;
    let to = parse_instant(&target.to).context("attest.to")?;
    let request_id = stable_id(
        "attest",
        &format!(
            "{}:{}:{}:{}",
            target.tenant_id,
            target.company_id,
            iso_millis(&from),
            iso_millis(&to)
        ),
    );

    Ok(EvidenceRequest {
        tenant_id: target.tenant_id.as_str().into(),
        actor_id: target.actor_id.as_str().into(),
        request_id: RequestId::new(request_id),
        company_id: target.company_id.as_str().into(),
        from,
        to,
        admission_decision: None,
        admission_reason: None,
        retention_data_type: RetentionDataType::AuditLogs,
    })
}

fn parse_instant(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}
