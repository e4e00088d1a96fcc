use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::database_error;
use crate::{AttemptRecord, AttemptStore, AuthError};

/// Postgres-backed attempt store, shared by every process using the pool.
///
/// # Table Schema
///
/// ```sql
/// CREATE TABLE login_attempts (
///     identifier VARCHAR(255) PRIMARY KEY,
///     attempts INTEGER NOT NULL DEFAULT 0,
///     last_try TIMESTAMPTZ NOT NULL
/// );
/// ```
#[derive(Clone)]
pub struct PostgresAttemptStore {
    pool: PgPool,
}

impl PostgresAttemptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Deletes records whose last failure is at or before `stale_before`.
    ///
    /// Call this periodically to bound table growth.
    pub async fn prune_stale(&self, stale_before: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE last_try <= $1")
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
    attempts: i32,
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
impl AttemptStore for PostgresAttemptStore {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, identifier), err))]
    async fn get(&self, identifier: &str) -> Result<Option<AttemptRecord>, AuthError> {
        let row: Option<AttemptRow> = sqlx::query_as(
            "SELECT identifier, attempts, last_try FROM login_attempts WHERE identifier = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("get_attempts", &e))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, record), err))]
    async fn upsert(&self, record: &AttemptRecord) -> Result<(), AuthError> {
        let attempts = i32::try_from(record.count).unwrap_or(i32::MAX);

        sqlx::query(
            r"
            INSERT INTO login_attempts (identifier, attempts, last_try)
            VALUES ($1, $2, $3)
            ON CONFLICT (identifier) DO UPDATE SET
                attempts = EXCLUDED.attempts,
                last_try = EXCLUDED.last_try
            ",
        )
        .bind(&record.identifier)
        .bind(attempts)
        .bind(record.last_try)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("upsert_attempts", &e))?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, identifier), err))]
    async fn delete(&self, identifier: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM login_attempts WHERE identifier = $1")
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
        // single statement, so concurrent failures serialize on the row lock
        let row: AttemptRow = sqlx::query_as(
            r"
            INSERT INTO login_attempts (identifier, attempts, last_try)
            VALUES ($1, 1, $2)
            ON CONFLICT (identifier) DO UPDATE SET
                attempts = CASE
                    WHEN login_attempts.last_try <= $3 THEN 1
                    ELSE login_attempts.attempts + 1
                END,
                last_try = EXCLUDED.last_try
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
            "UPDATE login_attempts SET attempts = 0 WHERE identifier = $1 AND last_try <= $2",
        )
        .bind(identifier)
        .bind(stale_before)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("reset_stale_attempts", &e))?;

        Ok(result.rows_affected() > 0)
    }
}
