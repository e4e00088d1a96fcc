use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuthError, SecretString};

/// Token handed out after a successful login.
///
/// `token` holds the plaintext value only when freshly created; stores keep a hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: SecretString,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Token issuance consumed by the login gate.
#[async_trait]
pub trait TokenRepository {
    async fn create_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, AuthError>;

    /// Looks a token up by its plaintext value.
    async fn find_token(&self, token: &str) -> Result<Option<AccessToken>, AuthError>;
}
