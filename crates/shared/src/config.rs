//! Application configuration management.

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Runtime environment facts.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Database configuration (absent when running against in-memory stores).
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Capacity limits reported in compliance snapshots.
    #[serde(default)]
    pub capacity: CapacityConfig,
    /// Retention policy overrides.
    #[serde(default)]
    pub retention: RetentionConfig,
    /// SLO thresholds.
    #[serde(default)]
    pub slo: SloConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Evidence target for the attestor binary.
    #[serde(default)]
    pub attest: Option<AttestTargetConfig>,
}

/// Runtime environment configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// Environment name (e.g., "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Freezes every "current time" read to the Unix epoch.
    #[serde(default)]
    pub deterministic: bool,
    /// Whether the process runs under CI.
    #[serde(default)]
    pub ci: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            deterministic: false,
            ci: false,
        }
    }
}

fn default_environment() -> String {
    "development".to_string()
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Capacity configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityConfig {
    /// Maximum requests processed concurrently.
    #[serde(default = "default_max_inflight")]
    pub max_inflight_requests: u32,
    /// Maximum requests waiting for a slot.
    #[serde(default = "default_max_queue_depth")]
    pub max_queue_depth: u32,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            max_inflight_requests: default_max_inflight(),
            max_queue_depth: default_max_queue_depth(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_max_inflight() -> u32 {
    64
}

fn default_max_queue_depth() -> u32 {
    256
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Retention overrides, in days. Unset entries fall back to the built-in policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetentionConfig {
    /// Days to keep audit logs.
    pub audit_logs_days: Option<u32>,
    /// Days to keep database backups.
    pub database_backups_days: Option<u32>,
    /// Days to keep soft-deleted tenants.
    pub soft_deleted_tenants_days: Option<u32>,
    /// Days to keep user data.
    pub user_data_days: Option<u32>,
}

/// SLO threshold configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SloConfig {
    /// Maximum error rate, as a decimal percentage string (e.g. "1.5").
    #[serde(default = "default_max_error_rate_pct")]
    pub max_error_rate_pct: String,
    /// Maximum p95 latency in milliseconds.
    #[serde(default = "default_max_p95_latency_ms")]
    pub max_p95_latency_ms: u64,
}

impl Default for SloConfig {
    fn default() -> Self {
        Self {
            max_error_rate_pct: default_max_error_rate_pct(),
            max_p95_latency_ms: default_max_p95_latency_ms(),
        }
    }
}

fn default_max_error_rate_pct() -> String {
    "1".to_string()
}

fn default_max_p95_latency_ms() -> u64 {
    500
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Which ledger slice the attestor binary should produce evidence for.
#[derive(Debug, Clone, Deserialize)]
pub struct AttestTargetConfig {
    /// Tenant owning the company.
    pub tenant_id: String,
    /// Company whose ledger is attested.
    pub company_id: String,
    /// Actor recorded on the bundle.
    #[serde(default = "default_actor")]
    pub actor_id: String,
    /// Inclusive range start (RFC 3339).
    pub from: String,
    /// Exclusive range end (RFC 3339).
    pub to: String,
}

fn default_actor() -> String {
    "system:attestor".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
