//! Storage-specific error type wrapping sqlx errors.

use icv6_domain::error::Icv6Error;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to serialize or deserialize a stored JSON column.
    #[error("JSON column error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A row holds a value the domain cannot represent.
    #[error("corrupt {table} row: {reason}")]
    Corrupt {
        table: &'static str,
        reason: String,
    },
}

impl From<StorageError> for Icv6Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Wrap a row-level decoding failure so sqlx reports it from `FromRow`.
pub(crate) fn decode_err(err: impl Into<StorageError>) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_to_storage_kind() {
        let err: Icv6Error = StorageError::Corrupt {
            table: "active_target",
            reason: "unknown mode \"eco\"".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "storage");
        assert!(err.report().contains("corrupt active_target row"));
    }

    #[test]
    fn should_keep_sqlx_error_as_source() {
        let err: Icv6Error = StorageError::from(sqlx::Error::RowNotFound).into();
        assert!(err.report().starts_with("storage error: database error: "));
    }
}
