//! `SQLite` implementation of [`PollingConfigRepository`], backed by the
//! `app_settings` key/value table.

use std::future::Future;

use sqlx::SqlitePool;

use icv6_app::ports::PollingConfigRepository;
use icv6_domain::error::Icv6Error;
use icv6_domain::reconciliation::PollingConfig;

use crate::error::StorageError;

const ENABLED_KEY: &str = "reconciliation_polling_enabled";
const INTERVAL_KEY: &str = "reconciliation_polling_interval_minutes";

const SELECT: &str = "SELECT key, value FROM app_settings WHERE key IN (?, ?)";

const UPSERT: &str = r"
    INSERT INTO app_settings (key, value) VALUES (?, ?)
    ON CONFLICT (key) DO UPDATE SET value = excluded.value
";

/// Polling settings stored as two `app_settings` rows.
///
/// Missing or unparsable values fall back to the defaults given at
/// construction, field by field.
#[derive(Clone)]
pub struct SqlitePollingConfigRepository {
    pool: SqlitePool,
    defaults: PollingConfig,
}

impl SqlitePollingConfigRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool, defaults: PollingConfig) -> Self {
        Self { pool, defaults }
    }
}

fn parse_enabled(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_interval(value: &str) -> Option<u32> {
    value
        .trim()
        .parse()
        .ok()
        .filter(|minutes| PollingConfig::new(true, *minutes).is_ok())
}

fn merge(defaults: PollingConfig, rows: Vec<(String, String)>) -> PollingConfig {
    let mut config = defaults;
    for (key, value) in rows {
        match key.as_str() {
            ENABLED_KEY => match parse_enabled(&value) {
                Some(enabled) => config.enabled = enabled,
                None => tracing::warn!(%key, %value, "ignoring unparsable setting"),
            },
            INTERVAL_KEY => match parse_interval(&value) {
                Some(minutes) => config.interval_minutes = minutes,
                None => tracing::warn!(%key, %value, "ignoring unparsable setting"),
            },
            _ => {}
        }
    }
    config
}

impl PollingConfigRepository for SqlitePollingConfigRepository {
    fn get(&self) -> impl Future<Output = Result<PollingConfig, Icv6Error>> + Send {
        let pool = self.pool.clone();
        let defaults = self.defaults;
        async move {
            let rows: Vec<(String, String)> = sqlx::query_as(SELECT)
                .bind(ENABLED_KEY)
                .bind(INTERVAL_KEY)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(merge(defaults, rows))
        }
    }

    fn set(
        &self,
        config: PollingConfig,
    ) -> impl Future<Output = Result<PollingConfig, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            sqlx::query(UPSERT)
                .bind(ENABLED_KEY)
                .bind(if config.enabled { "1" } else { "0" })
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            sqlx::query(UPSERT)
                .bind(INTERVAL_KEY)
                .bind(config.interval_minutes.to_string())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            tx.commit().await.map_err(StorageError::from)?;

            Ok(config)
        }
    }
}
