use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::JwtService;
use crate::{AccessToken, AuthError, SecretString, TokenRepository};

/// Stateless [`TokenRepository`]: tokens are signed, not stored.
#[derive(Clone)]
pub struct JwtTokenProvider {
    service: JwtService,
}

impl JwtTokenProvider {
    pub fn new(service: JwtService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TokenRepository for JwtTokenProvider {
    async fn create_token(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<AccessToken, AuthError> {
        let token = self.service.encode(user_id, expires_at)?;

        Ok(AccessToken {
            token: SecretString::new(token),
            user_id,
            expires_at,
            created_at: Utc::now(),
        })
    }

    async fn find_token(&self, token: &str) -> Result<Option<AccessToken>, AuthError> {
        match self.service.decode(token) {
            Ok(claims) => {
                let user_id = claims.user_id()?;
                let expires_at =
                    DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::TokenInvalid)?;
                let created_at =
                    DateTime::from_timestamp(claims.iat, 0).ok_or(AuthError::TokenInvalid)?;

                Ok(Some(AccessToken {
                    token: SecretString::new(token),
                    user_id,
                    expires_at,
                    created_at,
                }))
            }
            Err(AuthError::TokenExpired) => Err(AuthError::TokenExpired),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::jwt::JwtConfig;

    fn provider() -> JwtTokenProvider {
        let config = JwtConfig::new("test-secret-32-bytes-long-key-13").unwrap();
        JwtTokenProvider::new(JwtService::new(config))
    }

    #[tokio::test]
    async fn test_jwt_provider_create_and_find() {
        let provider = provider();

        let expires_at = Utc::now() + Duration::hours(1);
        let token = provider.create_token(42, expires_at).await.unwrap();
        assert_eq!(token.user_id, 42);
        assert!(!token.token.is_empty());

        let found = provider
            .find_token(token.token.expose_secret())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user_id, 42);
        assert_eq!(found.expires_at.timestamp(), expires_at.timestamp());
    }

    #[tokio::test]
    async fn test_jwt_provider_invalid_token() {
        let result = provider().find_token("invalid-token").await.unwrap();
        assert!(result.is_none());
    }
}
