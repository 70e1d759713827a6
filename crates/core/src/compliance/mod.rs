//! Compliance snapshots.
//!
//! A snapshot records, as of one instant, the facts an auditor needs about a
//! running deployment:
//! - Environment facts (environment name, CI and deterministic flags, versions, platform)
//! - Permission registry statistics
//! - Capacity configuration
//! - Degradation level and kill-switch states
//! - Optionally, readiness gate results
//!
//! Collaborators are consumed through read-only traits. Snapshots carry an
//! integrity hash like audit evidence bundles do.

pub mod control_plane;
pub mod environment;
pub mod error;
pub mod permissions;
pub mod readiness;
pub mod service;
pub mod types;


pub use control_plane::{
    ControlPlaneReader, ControlPlaneState, DegradationLevel, KillSwitchName, KillSwitchState,
    global,
};
pub use environment::{EnvironmentFacts, EnvironmentProbe, ProcessEnvironment};
pub use error::{ReadinessError, SnapshotError};
pub use permissions::{PermissionRegistry, RolePermissionCount, StaticPermissionRegistry};
pub use readiness::{
    LedgerReadinessGates, ReadinessGateResult, ReadinessGateRunner, ReadinessReport,
    ReadinessStatus,
};
pub use service::{ComplianceService, SnapshotDependencies};
pub use types::*;
