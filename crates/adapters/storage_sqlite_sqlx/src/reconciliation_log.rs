//! `SQLite` implementation of [`ReconciliationLog`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use icv6_app::ports::ReconciliationLog;
use icv6_domain::error::Icv6Error;
use icv6_domain::reconciliation::{ReconciliationOutcome, ReconciliationRun};
use icv6_domain::time::Timestamp;

use crate::error::{StorageError, decode_err};

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(ReconciliationRun);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let checked_at: String = row.try_get("checked_at")?;
        let details_json: String = row.try_get("details_json")?;

        let checked_at = chrono::DateTime::parse_from_rfc3339(&checked_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();
        let outcome: ReconciliationOutcome =
            serde_json::from_str(&details_json).map_err(decode_err)?;

        Ok(Self(ReconciliationRun {
            id,
            checked_at,
            outcome,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO reconciliation_runs (checked_at, status, details_json)
    VALUES (?, ?, ?)
";

const SELECT_LATEST: &str = "SELECT * FROM reconciliation_runs ORDER BY id DESC LIMIT 1";

const SELECT_RECENT: &str = "SELECT * FROM reconciliation_runs ORDER BY id DESC LIMIT ?";

/// `SQLite`-backed append-only run log.
#[derive(Clone)]
pub struct SqliteReconciliationLog {
    pool: SqlitePool,
}

impl SqliteReconciliationLog {
    /// Create a new log using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReconciliationLog for SqliteReconciliationLog {
    fn append(
        &self,
        outcome: ReconciliationOutcome,
        checked_at: Timestamp,
    ) -> impl Future<Output = Result<ReconciliationRun, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let details = serde_json::to_string(&outcome).map_err(StorageError::from)?;
            let result = sqlx::query(INSERT)
                .bind(checked_at.to_rfc3339())
                .bind(outcome.status())
                .bind(details)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(ReconciliationRun {
                id: result.last_insert_rowid(),
                checked_at,
                outcome,
            })
        }
    }

    fn latest(
        &self,
    ) -> impl Future<Output = Result<Option<ReconciliationRun>, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_LATEST)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ReconciliationRun>, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT)
                .bind(i64::try_from(limit).unwrap_or(i64::MAX))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pool;
    use icv6_domain::lighting::{DeviceMode, Program};
    use icv6_domain::reconciliation::SkipReason;
    use icv6_domain::time::now;

    #[tokio::test]
    async fn should_assign_increasing_ids_on_append() {
        let log = SqliteReconciliationLog::new(test_pool().await);

        let first = log
            .append(
                ReconciliationOutcome::Skipped(SkipReason::NoActiveProgram),
                now(),
            )
            .await
            .unwrap();
        let second = log
            .append(
                ReconciliationOutcome::Ok {
                    program: Program::default(),
                },
                now(),
            )
            .await
            .unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn should_return_latest_run_with_its_outcome() {
        let log = SqliteReconciliationLog::new(test_pool().await);
        let outcome = ReconciliationOutcome::Skipped(SkipReason::DeviceNotInAutoMode {
            mode: DeviceMode::Manual,
        });
        let appended = log.append(outcome, now()).await.unwrap();

        let latest = log.latest().await.unwrap().unwrap();

        assert_eq!(latest, appended);
    }

    #[tokio::test]
    async fn should_store_status_in_its_own_column() {
        let pool = test_pool().await;
        let log = SqliteReconciliationLog::new(pool.clone());
        log.append(
            ReconciliationOutcome::Error {
                message: "device communication error: timed out".to_string(),
                kind: "device".to_string(),
            },
            now(),
        )
        .await
        .unwrap();

        let (status,): (String,) = sqlx::query_as("SELECT status FROM reconciliation_runs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, "error");
    }

    #[tokio::test]
    async fn should_list_recent_runs_newest_first_up_to_limit() {
        let log = SqliteReconciliationLog::new(test_pool().await);
        for _ in 0..5 {
            log.append(
                ReconciliationOutcome::Skipped(SkipReason::NoActiveProgram),
                now(),
            )
            .await
            .unwrap();
        }

        let runs = log.recent(3).await.unwrap();

        let ids: Vec<i64> = runs.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[tokio::test]
    async fn should_return_none_when_log_is_empty() {
        let log = SqliteReconciliationLog::new(test_pool().await);
        assert!(log.latest().await.unwrap().is_none());
        assert!(log.recent(10).await.unwrap().is_empty());
    }
}
