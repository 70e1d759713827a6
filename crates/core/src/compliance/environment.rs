//! Environment facts.

use serde::{Deserialize, Serialize};
use tally_shared::config::RuntimeConfig;

use crate::canonical::Clock;

/// Facts about the running process.
///
/// Version, runtime version and platform are reported as-is even in
/// deterministic mode; only the logical timestamp is frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentFacts {
    /// Deployment environment name.
    pub environment: String,
    /// Whether the process runs under CI.
    pub ci: bool,
    /// Whether deterministic mode is on.
    pub deterministic: bool,
    /// Application version.
    pub version: String,
    /// Toolchain the application targets.
    pub runtime_version: String,
    /// `{os}-{arch}`.
    pub platform: String,
}

/// Source of environment facts.
pub trait EnvironmentProbe: Send + Sync {
    /// Reads the current facts.
    fn facts(&self) -> EnvironmentFacts;
}

/// Environment of the current process, resolved from runtime configuration
/// and build metadata.
#[derive(Debug, Clone)]
pub struct ProcessEnvironment {
    environment: String,
    ci: bool,
    deterministic: bool,
}

impl ProcessEnvironment {
    /// Captures the runtime flags. Deterministic mode is taken from the
    /// resolved clock.
    #[must_use]
    pub fn from_runtime(runtime: &RuntimeConfig, clock: &Clock) -> Self {
        Self {
            environment: runtime.environment.clone(),
            ci: runtime.ci,
            deterministic: clock.is_deterministic(),
        }
    }
}

impl EnvironmentProbe for ProcessEnvironment {
    fn facts(&self) -> EnvironmentFacts {
        EnvironmentFacts {
            environment: self.environment.clone(),
            ci: self.ci,
            deterministic: self.deterministic,
            version: env!("CARGO_PKG_VERSION").to_string(),
            runtime_version: format!("rust-{}", env!("CARGO_PKG_RUST_VERSION")),
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_environment_reflects_runtime() {
        let runtime = RuntimeConfig {
            environment: "staging".to_string(),
            deterministic: true,
            ci: true,
        };
        let clock = Clock::from_runtime(&runtime);
        let facts = ProcessEnvironment::from_runtime(&runtime, &clock).facts();
        assert_eq!(facts.environment, "staging");
        assert!(facts.ci);
        assert!(facts.deterministic);
        assert_eq!(facts.version, env!("CARGO_PKG_VERSION"));
        assert!(facts.runtime_version.starts_with("rust-"));
        assert!(facts.platform.contains('-'));
    }

    #[test]
    fn test_deterministic_flag_follows_clock() {
        let runtime = RuntimeConfig {
            environment: "test".to_string(),
            deterministic: true,
            ci: false,
        };
        let facts = ProcessEnvironment::from_runtime(&runtime, &Clock::System).facts();
        assert!(!facts.deterministic);

        let facts = ProcessEnvironment::from_runtime(&runtime, &Clock::deterministic()).facts();
        assert!(facts.deterministic);
    }
}
