use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Account the login gate authenticates against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(any(test, feature = "mocks"))]
impl AuthUser {
    pub fn mock_from_credentials(email: &str, hashed_password: &str) -> Self {
        AuthUser {
            id: 1,
            email: email.to_owned(),
            hashed_password: hashed_password.to_owned(),
            created_at: Utc::now(),
        }
    }
}

/// Credential store consumed by [`PasswordVerifier`](crate::PasswordVerifier).
#[async_trait]
pub trait UserRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<AuthUser, AuthError>;
}
