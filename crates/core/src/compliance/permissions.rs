//! Permission registry statistics.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Number of permissions granted to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionCount {
    /// Role name.
    pub role: String,
    /// Permissions granted to it.
    pub permission_count: usize,
}

/// Read-only view of the permission registry.
pub trait PermissionRegistry: Send + Sync {
    /// Number of distinct permissions known to the registry.
    fn total_permissions(&self) -> usize;

    /// Permission counts per role, in any order.
    fn role_permission_counts(&self) -> Vec<RolePermissionCount>;
}

/// Registry defined up front from role grants.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionRegistry {
    roles: BTreeMap<String, BTreeSet<String>>,
}

impl StaticPermissionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `permissions` to `role`.
    #[must_use]
    pub fn with_role<I, S>(mut self, role: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .entry(role.into())
            .or_default()
            .extend(permissions.into_iter().map(Into::into));
        self
    }
}

impl PermissionRegistry for StaticPermissionRegistry {
    fn total_permissions(&self) -> usize {
        self.roles
            .values()
            .flatten()
            .collect::<BTreeSet<_>>()
            .len()
    }

    fn role_permission_counts(&self) -> Vec<RolePermissionCount> {
        self.roles
            .iter()
            .map(|(role, permissions)| RolePermissionCount {
                role: role.clone(),
                permission_count: permissions.len(),
            })
            .collect()
    }
}
