use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use super::database_error;
use crate::crypto::{generate_token, hash_token};
use crate::{AccessToken, AuthError, SecretString, TokenRepository};

/// Opaque bearer tokens. Only the SHA-256 hash is stored.
#[derive(Clone)]
pub struct SqliteTokenRepository {
    pool: SqlitePool,
    token_length: usize,
}

impl SqliteTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_token_length(pool, crate::crypto::DEFAULT_TOKEN_LENGTH)
    }

    pub fn with_token_length(pool: SqlitePool, token_length: usize) -> Self {
        Self { pool, token_length }
    }
}

#[derive(FromRow)]
struct TokenRecord {
    user_id: i64,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TokenRecord {
    fn into_access_token(self, token: String) -> AccessToken {
        AccessToken {
            token: SecretString::new(token),
            user_id: self.user_id,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn create_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, AuthError> {
        let plain_token = generate_token(self.token_length);

        let row: TokenRecord = sqlx::query_as(
            r"INSERT INTO access_tokens (token_hash, user_id, expires_at)
              VALUES (?, ?, ?)
              RETURNING user_id, expires_at, created_at",
        )
        .bind(hash_token(&plain_token))
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("create_token", &e))?;

        Ok(row.into_access_token(plain_token))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, token), err))]
    async fn find_token(&self, token: &str) -> Result<Option<AccessToken>, AuthError> {
        let row: Option<TokenRecord> = sqlx::query_as(
            "SELECT user_id, expires_at, created_at FROM access_tokens WHERE token_hash = ?",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("find_token", &e))?;

        Ok(row.map(|r| r.into_access_token(token.to_owned())))
    }
}
