//! `SQLite` implementation of [`PresetRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use icv6_app::ports::PresetRepository;
use icv6_domain::error::{Icv6Error, ValidationError};
use icv6_domain::preset::{NewPreset, Preset, PresetId};
use icv6_domain::time::now;

use crate::error::StorageError;
use crate::target_repo::{columns, decode_target};

/// Wrapper for converting database rows into domain [`Preset`].
struct Wrapper(Preset);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let created_at: String = row.try_get("created_at")?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(Preset {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            target: decode_target("presets", row)?,
            created_at,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO presets (name, mode, intensity_json, program_json, created_at)
    VALUES (?, ?, ?, ?, ?)
";

const SELECT_ALL: &str = "SELECT * FROM presets ORDER BY id DESC";

const SELECT_ONE: &str = "SELECT * FROM presets WHERE id = ?";

const RENAME: &str = "UPDATE presets SET name = ? WHERE id = ?";

const DELETE: &str = "DELETE FROM presets WHERE id = ?";

/// `SQLite`-backed preset store.
#[derive(Clone)]
pub struct SqlitePresetRepository {
    pool: SqlitePool,
}

impl SqlitePresetRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Map a unique-constraint hit on `name` to a validation error.
fn name_conflict(err: sqlx::Error, name: String) -> Icv6Error {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        return ValidationError::DuplicateName(name).into();
    }
    StorageError::from(err).into()
}

impl PresetRepository for SqlitePresetRepository {
    fn create(&self, preset: NewPreset) -> impl Future<Output = Result<Preset, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let (intensity_json, program_json) = columns(&preset.target)?;
            let created_at = now();
            let result = sqlx::query(INSERT)
                .bind(&preset.name)
                .bind(preset.target.mode().as_str())
                .bind(intensity_json)
                .bind(program_json)
                .bind(created_at.to_rfc3339())
                .execute(&pool)
                .await;
            let result = match result {
                Ok(result) => result,
                Err(err) => return Err(name_conflict(err, preset.name)),
            };

            Ok(Preset {
                id: result.last_insert_rowid(),
                name: preset.name,
                target: preset.target,
                created_at,
            })
        }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Preset>, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn get(&self, id: PresetId) -> impl Future<Output = Result<Option<Preset>, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_ONE)
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn rename(
        &self,
        id: PresetId,
        name: String,
    ) -> impl Future<Output = Result<bool, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(RENAME)
                .bind(&name)
                .bind(id)
                .execute(&pool)
                .await;
            match result {
                Ok(result) => Ok(result.rows_affected() > 0),
                Err(err) => Err(name_conflict(err, name)),
            }
        }
    }

    fn delete(&self, id: PresetId) -> impl Future<Output = Result<bool, Icv6Error>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE)
                .bind(id)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}
