//! Compliance snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::config::CapacityConfig;

use super::control_plane::{DegradationLevel, KillSwitchName, KillSwitchState};
use super::environment::EnvironmentFacts;
use super::permissions::RolePermissionCount;
use super::readiness::ReadinessReport;
use crate::canonical::Attested;
use crate::canonical::serde_fmt::iso_millis_format;

/// Version tag of the compliance snapshot canonical field list.
pub const COMPLIANCE_SNAPSHOT_SCHEMA_VERSION: &str = "compliance_snapshot.v1";

/// Build options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotOptions {
    /// Run readiness gates. Ignored unless a runner and a store are supplied.
    pub include_readiness: bool,
}

/// Permission registry section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSummary {
    /// Distinct permissions.
    pub total_permissions: usize,
    /// Roles defined.
    pub total_roles: usize,
    /// Per-role counts, sorted by role name.
    pub roles: Vec<RolePermissionCount>,
}

/// One kill switch in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillSwitchEntry {
    /// Switch name.
    pub name: KillSwitchName,
    /// Switch state.
    #[serde(flatten)]
    pub state: KillSwitchState,
}

/// Everything in a snapshot except its integrity hash, in canonical field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSnapshotBase {
    /// Canonical field list version.
    pub schema_version: String,
    /// Snapshot time per the injected clock.
    #[serde(with = "iso_millis_format")]
    pub generated_at: DateTime<Utc>,
    /// Environment facts.
    pub environment: EnvironmentFacts,
    /// Permission registry statistics.
    pub permissions: PermissionSummary,
    /// Capacity limits.
    pub capacity: CapacityConfig,
    /// Degradation level.
    pub degradation_level: DegradationLevel,
    /// Every kill switch, in [`KillSwitchName::ALL`] order.
    pub kill_switches: Vec<KillSwitchEntry>,
    /// Readiness run, `null` when not requested or not possible.
    pub readiness: Option<ReadinessReport>,
}

/// A signed compliance snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSnapshot {
    /// Hashed content.
    #[serde(flatten)]
    pub base: ComplianceSnapshotBase,
    /// Digest of the canonical `base`.
    pub integrity_hash: String,
}

impl Attested for ComplianceSnapshot {
    type Canonical<'a> = &'a ComplianceSnapshotBase;

    fn canonical(&self) -> &ComplianceSnapshotBase {
        &self.base
    }

    fn integrity_hash(&self) -> &str {
        &self.integrity_hash
    }
}
