use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::database_error;
use crate::{AuthError, AuthUser, UserRepository};

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    hashed_password: String,
    created_at: DateTime<Utc>,
}

impl From<UserRecord> for AuthUser {
    fn from(row: UserRecord) -> Self {
        AuthUser {
            id: row.id,
            email: row.email,
            hashed_password: row.hashed_password,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email), err))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let row: Option<UserRecord> = sqlx::query_as(
            "SELECT id, email, hashed_password, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("find_user_by_email", &e))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, email, hashed_password), err)
    )]
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<AuthUser, AuthError> {
        let row: UserRecord = sqlx::query_as(
            "INSERT INTO users (email, hashed_password) VALUES (?, ?) RETURNING id, email, hashed_password, created_at",
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("create_user", &e))?;

        Ok(row.into())
    }
}
