#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::crypto::{generate_token, hash_token, DEFAULT_TOKEN_LENGTH};
use crate::{AuthError, SecretString};

use super::token::{AccessToken, TokenRepository};

#[derive(Clone, Default)]
pub struct MockTokenRepository {
    /// Stored tokens; the `token` field holds the SHA-256 hash.
    pub tokens: Arc<Mutex<Vec<AccessToken>>>,
}

impl MockTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn create_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, AuthError> {
        let plain_token = generate_token(DEFAULT_TOKEN_LENGTH);
        let now = Utc::now();

        let mut tokens = self.tokens.lock().unwrap();
        tokens.push(AccessToken {
            token: SecretString::new(hash_token(&plain_token)),
            user_id,
            expires_at,
            created_at: now,
        });
        drop(tokens);

        Ok(AccessToken {
            token: SecretString::new(plain_token),
            user_id,
            expires_at,
            created_at: now,
        })
    }

    async fn find_token(&self, token: &str) -> Result<Option<AccessToken>, AuthError> {
        let hashed = hash_token(token);
        let tokens = self.tokens.lock().unwrap();
        Ok(tokens
            .iter()
            .find(|t| t.token.expose_secret() == hashed)
            .cloned())
    }
}
