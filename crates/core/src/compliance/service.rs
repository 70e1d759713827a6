//! Compliance snapshot builder.

use crate::canonical::{Clock, digest_of};
use crate::ledger::LedgerStore;

use super::control_plane::{ControlPlaneReader, KillSwitchName};
use super::environment::EnvironmentProbe;
use super::error::SnapshotError;
use super::permissions::PermissionRegistry;
use super::readiness::ReadinessGateRunner;
use super::types::{
    COMPLIANCE_SNAPSHOT_SCHEMA_VERSION, ComplianceSnapshot, ComplianceSnapshotBase,
    KillSwitchEntry, PermissionSummary, SnapshotOptions,
};

/// Collaborators a snapshot build reads from.
#[derive(Clone, Copy)]
pub struct SnapshotDependencies<'a> {
    /// Environment facts.
    pub environment: &'a dyn EnvironmentProbe,
    /// Permission registry.
    pub permissions: &'a dyn PermissionRegistry,
    /// Kill switches, degradation and capacity.
    pub control_plane: &'a dyn ControlPlaneReader,
    /// Readiness gate runner.
    pub readiness: Option<&'a dyn ReadinessGateRunner>,
    /// Store the readiness gates run against.
    pub store: Option<&'a dyn LedgerStore>,
    /// Source of `generated_at`.
    pub clock: Clock,
}

/// Service for building compliance snapshots.
pub struct ComplianceService;

impl ComplianceService {
    /// Builds and signs a compliance snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the readiness runner fails.
    #[tracing::instrument(skip(deps))]
    pub async fn build_compliance_snapshot(
        deps: SnapshotDependencies<'_>,
        options: SnapshotOptions,
    ) -> Result<ComplianceSnapshot, SnapshotError> {
        let generated_at = deps.clock.now();

        let readiness = match (options.include_readiness, deps.readiness, deps.store) {
            (true, Some(runner), Some(store)) => Some(runner.run_readiness_gates(store).await?),
            _ => None,
        };

        let base = ComplianceSnapshotBase {
            schema_version: COMPLIANCE_SNAPSHOT_SCHEMA_VERSION.to_string(),
            generated_at,
            environment: deps.environment.facts(),
            permissions: Self::permission_summary(deps.permissions),
            capacity: deps.control_plane.capacity(),
            degradation_level: deps.control_plane.degradation_level(),
            kill_switches: KillSwitchName::ALL
                .into_iter()
                .map(|name| KillSwitchEntry {
                    name,
                    state: deps.control_plane.kill_switch(name),
                })
                .collect(),
            readiness,
        };
        let integrity_hash = digest_of(&base)?;

        tracing::info!(
            integrity_hash = %integrity_hash,
            degradation_level = base.degradation_level.as_str(),
            readiness = base.readiness.is_some(),
            "compliance snapshot built"
        );

        Ok(ComplianceSnapshot {
            base,
            integrity_hash,
        })
    }

    fn permission_summary(registry: &dyn PermissionRegistry) -> PermissionSummary {
        let mut roles = registry.role_permission_counts();
        roles.sort_by(|a, b| a.role.cmp(&b.role));
        PermissionSummary {
            total_permissions: registry.total_permissions(),
            total_roles: roles.len(),
            roles,
        }
    }
}
