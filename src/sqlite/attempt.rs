use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::database_error;
use crate::{AttemptRecord, AttemptStore, AuthError};

/// `SQLite`-backed attempt store.
///
/// Timestamps are stored as RFC 3339 text, all written by this store, so
/// the `last_try` comparisons below order correctly as strings.
///
/// # Table Schema
///
/// ```sql
/// CREATE TABLE login_attempts (
///     identifier TEXT PRIMARY KEY,
///     attempts INTEGER NOT NULL DEFAULT 0,
///     last_try TEXT NOT NULL
/// );
/// ```
#[derive(Clone)]
pub struct SqliteAttemptStore {
    pool: SqlitePool,
}

impl SqliteAttemptStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Deletes records whose last failure is at or before `stale_before`.
    pub async fn prune_stale(&self, stale_before: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE last_try <= ?")
            .bind(stale_before)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("prune_stale_attempts", &e))?;

        Ok(result.rows_affected())
    }
}

#[derive(FromRow)]
struct AttemptRow {
    identifier: String,
    attempts: i64,
    last_try: DateTime<Utc>,
}

impl From<AttemptRow> for AttemptRecord {
    fn from(row: AttemptRow) -> Self {
        AttemptRecord {
            identifier: row.identifier,
            count: u32::try_from(row.attempts).unwrap_or(0),
            last_try: row.last_try,
        }
    }
}

#[async_trait]
impl AttemptStore for SqliteAttemptStore {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, identifier), err))]
    async fn get(&self, identifier: &str) -> Result<Option<AttemptRecord>, AuthError> {
        let row: Option<AttemptRow> = sqlx::query_as(
            "SELECT identifier, attempts, last_try FROM login_attempts WHERE identifier = ?",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("get_attempts", &e))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, record), err))]
    async fn upsert(&self, record: &AttemptRecord) -> Result<(), AuthError> {
        sqlx::query(
            r"
            INSERT INTO login_attempts (identifier, attempts, last_try)
            VALUES (?, ?, ?)
            ON CONFLICT (identifier) DO UPDATE SET
                attempts = excluded.attempts,
                last_try = excluded.last_try
            ",
        )
        .bind(&record.identifier)
        .bind(i64::from(record.count))
        .bind(record.last_try)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("upsert_attempts", &e))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, identifier), err))]
    async fn delete(&self, identifier: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM login_attempts WHERE identifier = ?")
            .bind(identifier)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete_attempts", &e))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, identifier), err))]
    async fn increment(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<AttemptRecord, AuthError> {
        // SQLite 3.35.0+ supports RETURNING
        let row: AttemptRow = sqlx::query_as(
            r"
            INSERT INTO login_attempts (identifier, attempts, last_try)
            VALUES (?, 1, ?)
            ON CONFLICT (identifier) DO UPDATE SET
                attempts = CASE
                    WHEN login_attempts.last_try <= ? THEN 1
                    ELSE login_attempts.attempts + 1
                END,
                last_try = excluded.last_try
            RETURNING identifier, attempts, last_try
            ",
        )
        .bind(identifier)
        .bind(now)
        .bind(stale_before)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("increment_attempts", &e))?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, identifier), err))]
    async fn reset_stale(
        &self,
        identifier: &str,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "UPDATE login_attempts SET attempts = 0 WHERE identifier = ? AND last_try <= ?",
        )
        .bind(identifier)
        .bind(stale_before)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("reset_stale_attempts", &e))?;

        Ok(result.rows_affected() > 0)
    }
}
