//! # icv6-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the storage port traits defined in `icv6-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `icv6-app` (for port traits) and `icv6-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod polling_repo;
mod pool;
mod preset_repo;
mod reconciliation_log;
mod target_repo;

pub use error::StorageError;
pub use polling_repo::SqlitePollingConfigRepository;
pub use pool::{Config, Database};
pub use preset_repo::SqlitePresetRepository;
pub use reconciliation_log::SqliteReconciliationLog;
pub use target_repo::SqliteActiveTargetRepository;

#[cfg(test)]
async fn test_pool() -> sqlx::SqlitePool {
    Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .unwrap()
    .pool()
    .clone()
}
