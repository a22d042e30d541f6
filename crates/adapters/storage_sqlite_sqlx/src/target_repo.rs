//! `SQLite` implementation of [`ActiveTargetRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use icv6_app::ports::ActiveTargetRepository;
use icv6_domain::error::Icv6Error;
use icv6_domain::target::ActiveTarget;
use icv6_domain::time::now;

use crate::error::{StorageError, decode_err};

/// Wrapper for converting database rows into domain [`ActiveTarget`].
struct Wrapper(ActiveTarget);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        decode_target("active_target", row).map(Self)
    }
}

/// Decode the `mode` / `intensity_json` / `program_json` columns shared by
/// `active_target` and `presets`.
pub(crate) fn decode_target(
    table: &'static str,
    row: &SqliteRow,
) -> Result<ActiveTarget, sqlx::Error> {
    let mode: String = row.try_get("mode")?;
    let intensity_json: Option<String> = row.try_get("intensity_json")?;
    let program_json: Option<String> = row.try_get("program_json")?;

    match (mode.as_str(), intensity_json, program_json) {
        ("manual", Some(json), _) => Ok(ActiveTarget::Manual {
            intensity: serde_json::from_str(&json).map_err(decode_err)?,
        }),
        ("auto", _, Some(json)) => Ok(ActiveTarget::Auto {
            program: serde_json::from_str(&json).map_err(decode_err)?,
        }),
        (other, _, _) => Err(decode_err(StorageError::Corrupt {
            table,
            reason: format!("mode {other:?} without its payload"),
        })),
    }
}

const SELECT: &str =
    "SELECT mode, intensity_json, program_json FROM active_target WHERE id = 1";

const UPSERT: &str = r"
    INSERT INTO active_target (id, mode, intensity_json, program_json, updated_at)
    VALUES (1, ?, ?, ?, ?)
    ON CONFLICT (id) DO UPDATE SET
        mode = excluded.mode,
        intensity_json = excluded.intensity_json,
        program_json = excluded.program_json,
        updated_at = excluded.updated_at
";

/// `SQLite`-backed single-row store for the active target.
#[derive(Clone)]
pub struct SqliteActiveTargetRepository {
    pool: SqlitePool,
}

impl SqliteActiveTargetRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub(crate) fn columns(
    target: &ActiveTarget,
) -> Result<(Option<String>, Option<String>), StorageError> {
    Ok(match target {
        ActiveTarget::Manual { intensity } => (Some(serde_json::to_string(intensity)?), None),
        ActiveTarget::Auto { program } => (None, Some(serde_json::to_string(program)?)),
    })
}

impl ActiveTargetRepository for SqliteActiveTargetRepository {
    fn get(&self) -> impl Future<Output = Result<Option<ActiveTarget>, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn upsert(
        &self,
        target: ActiveTarget,
    ) -> impl Future<Output = Result<ActiveTarget, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let (intensity_json, program_json) = columns(&target)?;
            sqlx::query(UPSERT)
                .bind(target.mode().as_str())
                .bind(intensity_json)
                .bind(program_json)
                .bind(now().to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pool;
    use icv6_domain::lighting::{Intensity, Program, ProgramPoint};

    fn program() -> Program {
        Program::new(vec![ProgramPoint {
            index: 1,
            hour: 9,
            minute: 30,
            ch1: 80,
            ch2: 60,
            ch3: 40,
            ch4: 20,
        }])
    }

    #[tokio::test]
    async fn should_return_none_when_nothing_stored() {
        let repo = SqliteActiveTargetRepository::new(test_pool().await);
        assert!(repo.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_roundtrip_auto_target() {
        let repo = SqliteActiveTargetRepository::new(test_pool().await);
        let target = ActiveTarget::Auto { program: program() };

        repo.upsert(target.clone()).await.unwrap();

        assert_eq!(repo.get().await.unwrap(), Some(target));
    }

    #[tokio::test]
    async fn should_replace_whole_row_on_upsert() {
        let pool = test_pool().await;
        let repo = SqliteActiveTargetRepository::new(pool.clone());
        repo.upsert(ActiveTarget::Auto { program: program() })
            .await
            .unwrap();

        let manual = ActiveTarget::Manual {
            intensity: Intensity::from_channels([1, 2, 3, 4]),
        };
        repo.upsert(manual.clone()).await.unwrap();

        assert_eq!(repo.get().await.unwrap(), Some(manual));
        let (count, program_json): (i64, Option<String>) =
            sqlx::query_as("SELECT COUNT(*), MAX(program_json) FROM active_target")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
        assert!(program_json.is_none());
    }

    #[tokio::test]
    async fn should_report_storage_error_for_corrupt_json() {
        let pool = test_pool().await;
        sqlx::query(
            "INSERT INTO active_target (id, mode, intensity_json, updated_at) VALUES (1, 'manual', 'not json', 'x')",
        )
        .execute(&pool)
        .await
        .unwrap();
        let repo = SqliteActiveTargetRepository::new(pool);

        let err = repo.get().await.unwrap_err();

        assert_eq!(err.kind(), "storage");
    }
}
