//! Retention periods per data type.

use serde::{Deserialize, Serialize};
use tally_shared::config::RetentionConfig;

/// Class of data subject to retention rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetentionDataType {
    /// Audit trail entries.
    AuditLogs,
    /// Database backup archives.
    DatabaseBackups,
    /// Tenants marked deleted but not yet purged.
    SoftDeletedTenants,
    /// Personal data of users.
    UserData,
}

impl RetentionDataType {
    /// Returns the string representation of the data type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AuditLogs => "AUDIT_LOGS",
            Self::DatabaseBackups => "DATABASE_BACKUPS",
            Self::SoftDeletedTenants => "SOFT_DELETED_TENANTS",
            Self::UserData => "USER_DATA",
        }
    }
}

impl std::fmt::Display for RetentionDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retention period in days for each data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Days to keep audit logs (seven years by default).
    pub audit_logs_days: u32,
    /// Days to keep database backups.
    pub database_backups_days: u32,
    /// Days to keep soft-deleted tenants.
    pub soft_deleted_tenants_days: u32,
    /// Days to keep user data.
    pub user_data_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            audit_logs_days: 2555,
            database_backups_days: 365,
            soft_deleted_tenants_days: 90,
            user_data_days: 730,
        }
    }
}

impl RetentionPolicy {
    /// Default policy with any configured overrides applied.
    #[must_use]
    pub fn with_overrides(config: &RetentionConfig) -> Self {
        let defaults = Self::default();
        Self {
            audit_logs_days: config.audit_logs_days.unwrap_or(defaults.audit_logs_days),
            database_backups_days: config
                .database_backups_days
                .unwrap_or(defaults.database_backups_days),
            soft_deleted_tenants_days: config
                .soft_deleted_tenants_days
                .unwrap_or(defaults.soft_deleted_tenants_days),
            user_data_days: config.user_data_days.unwrap_or(defaults.user_data_days),
        }
    }

    /// Retention period for `data_type`.
    #[must_use]
    pub const fn days_for(&self, data_type: RetentionDataType) -> u32 {
        match data_type {
            RetentionDataType::AuditLogs => self.audit_logs_days,
            RetentionDataType::DatabaseBackups => self.database_backups_days,
            RetentionDataType::SoftDeletedTenants => self.soft_deleted_tenants_days,
            RetentionDataType::UserData => self.user_data_days,
        }
    }
}
