//! Process-wide kill switches, degradation level and capacity limits.
//!
//! Operators mutate [`ControlPlaneState`]; snapshot builders only see it
//! through [`ControlPlaneReader`].

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tally_shared::config::CapacityConfig;

use crate::canonical::serde_fmt::iso_millis_option;

/// Switches that can shut off a capability at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KillSwitchName {
    /// Ledger postings.
    LedgerWrites,
    /// Report exports.
    ReportExports,
    /// Evidence bundle exports.
    EvidenceExports,
    /// Outbound integrations.
    Integrations,
}

impl KillSwitchName {
    /// Every switch, in reporting order.
    pub const ALL: [Self; 4] = [
        Self::LedgerWrites,
        Self::ReportExports,
        Self::EvidenceExports,
        Self::Integrations,
    ];

    /// Returns the string representation of the switch name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LedgerWrites => "LEDGER_WRITES",
            Self::ReportExports => "REPORT_EXPORTS",
            Self::EvidenceExports => "EVIDENCE_EXPORTS",
            Self::Integrations => "INTEGRATIONS",
        }
    }
}

/// State of one kill switch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillSwitchState {
    /// Whether the capability is shut off.
    pub enabled: bool,
    /// Why the switch was last changed.
    pub reason: Option<String>,
    /// When the switch was last changed.
    #[serde(with = "iso_millis_option")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Who last changed the switch.
    pub updated_by: Option<String>,
}

/// Service degradation level, from healthy to most restricted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DegradationLevel {
    /// Fully operational.
    #[default]
    Normal,
    /// Non-essential work is shed.
    Degraded,
    /// Writes are refused.
    ReadOnly,
    /// Only health and audit endpoints serve.
    Emergency,
}

impl DegradationLevel {
    /// Returns the string representation of the level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Degraded => "DEGRADED",
            Self::ReadOnly => "READ_ONLY",
            Self::Emergency => "EMERGENCY",
        }
    }

    const fn to_u8(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Degraded => 1,
            Self::ReadOnly => 2,
            Self::Emergency => 3,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Normal,
            1 => Self::Degraded,
            2 => Self::ReadOnly,
            _ => Self::Emergency,
        }
    }
}

/// Read-only access to control plane state.
pub trait ControlPlaneReader: Send + Sync {
    /// Current state of `name`.
    fn kill_switch(&self, name: KillSwitchName) -> KillSwitchState;

    /// Current degradation level.
    fn degradation_level(&self) -> DegradationLevel;

    /// Current capacity limits.
    fn capacity(&self) -> CapacityConfig;
}

/// Mutable control plane state.
#[derive(Debug, Default)]
pub struct ControlPlaneState {
    kill_switches: DashMap<KillSwitchName, KillSwitchState>,
    degradation: AtomicU8,
    capacity: RwLock<CapacityConfig>,
}

impl ControlPlaneState {
    /// Creates a state with every switch off, `NORMAL` degradation and default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state with the given capacity limits.
    #[must_use]
    pub fn with_capacity(capacity: CapacityConfig) -> Self {
        Self {
            capacity: RwLock::new(capacity),
            ..Self::default()
        }
    }

    /// Flips a kill switch.
    pub fn set_kill_switch(
        &self,
        name: KillSwitchName,
        enabled: bool,
        reason: impl Into<String>,
        updated_by: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) {
        let updated_by: String = updated_by.into();
        tracing::info!(
            switch = name.as_str(),
            enabled,
            updated_by = %updated_by,
            "kill switch changed"
        );
        let state = KillSwitchState {
            enabled,
            reason: Some(reason.into()),
            updated_at: Some(updated_at),
            updated_by: Some(updated_by),
        };
        self.kill_switches.insert(name, state);
    }

    /// Sets the degradation level.
    pub fn set_degradation_level(&self, level: DegradationLevel) {
        tracing::info!(level = level.as_str(), "degradation level changed");
        self.degradation.store(level.to_u8(), Ordering::SeqCst);
    }

    /// Replaces the capacity limits.
    pub fn set_capacity(&self, capacity: CapacityConfig) {
        *self
            .capacity
            .write()
            .unwrap_or_else(PoisonError::into_inner) = capacity;
    }
}

impl ControlPlaneReader for ControlPlaneState {
    fn kill_switch(&self, name: KillSwitchName) -> KillSwitchState {
        self.kill_switches
            .get(&name)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn degradation_level(&self) -> DegradationLevel {
        DegradationLevel::from_u8(self.degradation.load(Ordering::SeqCst))
    }

    fn capacity(&self) -> CapacityConfig {
        self.capacity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

static GLOBAL: Lazy<ControlPlaneState> = Lazy::new(ControlPlaneState::new);

/// The process-wide control plane.
#[must_use]
pub fn global() -> &'static ControlPlaneState {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let state = ControlPlaneState::new();
        assert_eq!(state.degradation_level(), DegradationLevel::Normal);
        assert_eq!(state.capacity(), CapacityConfig::default());
        for name in KillSwitchName::ALL {
            assert_eq!(state.kill_switch(name), KillSwitchState::default());
        }
    }

    #[test]
    fn test_mutations_are_visible_to_readers() {
        let state = ControlPlaneState::new();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        state.set_kill_switch(KillSwitchName::LedgerWrites, true, "incident 17", "ops:alice", at);
        state.set_degradation_level(DegradationLevel::ReadOnly);
        state.set_capacity(CapacityConfig {
            max_inflight_requests: 4,
            ..CapacityConfig::default()
        });

        let reader: &dyn ControlPlaneReader = &state;
        let switch = reader.kill_switch(KillSwitchName::LedgerWrites);
        assert!(switch.enabled);
        assert_eq!(switch.reason.as_deref(), Some("incident 17"));
        assert_eq!(switch.updated_at, Some(at));
        assert!(!reader.kill_switch(KillSwitchName::Integrations).enabled);
        assert_eq!(reader.degradation_level(), DegradationLevel::ReadOnly);
        assert_eq!(reader.capacity().max_inflight_requests, 4);
    }

    #[test]
    fn test_degradation_level_encoding() {
        for level in [
            DegradationLevel::Normal,
            DegradationLevel::Degraded,
            DegradationLevel::ReadOnly,
            DegradationLevel::Emergency,
        ] {
            assert_eq!(DegradationLevel::from_u8(level.to_u8()), level);
        }
        assert_eq!(DegradationLevel::ReadOnly.as_str(), "READ_ONLY");
    }

    #[test]
    fn test_kill_switch_wire_names() {
        for name in KillSwitchName::ALL {
            assert_eq!(
                serde_json::to_string(&name).unwrap(),
                format!("\"{}\"", name.as_str())
            );
        }
        assert_eq!(
            serde_json::to_string(&KillSwitchName::LedgerWrites).unwrap(),
            r#""LEDGER_WRITES""#
        );
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(global(), global()));
    }
}
