use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::LoginResponse;
use crate::{AuthError, SecretString};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

// Response DTOs

#[derive(Serialize)]
pub struct TokenResponse {
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl From<LoginResponse> for TokenResponse {
    fn from(response: LoginResponse) -> Self {
        TokenResponse {
            token_type: response.token_type,
            token: response.token.token,
            expires_at: response.token.expires_at,
        }
    }
}

/// Body of a 429 response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        ErrorResponse {
            error: err.to_string(),
            code: err.code().to_owned(),
        }
    }
}
