//! Postgres adapters for the Tally core contracts.
//!
//! This crate provides:
//! - `PgLedgerStore`, a read-only `LedgerStore` over posted transactions
//! - `PgPeriodLockState`, a `PeriodLockState` over fiscal period date ranges
//! - Connection setup from `DatabaseConfig`

pub mod ledger_store;
pub mod period_lock;

pub use ledger_store::PgLedgerStore;
pub use period_lock::PgPeriodLockState;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tally_shared::config::DatabaseConfig;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
