//! Login brute-force protection.
//!
//! `portcullis` tracks failed login attempts per identifier (usually an email
//! address), blocks the identifier once it reaches the configured cap and
//! lets it back in after a cooldown has passed since the last failure.
//!
//! The pieces, leaves first:
//!
//! - [`Clock`]: injectable time source.
//! - [`AttemptStore`]: keyed persistence for [`AttemptRecord`]s.
//! - [`AttemptTracker`]: the lockout policy.
//! - [`actions::LoginGate`]: runs one login request end to end.
//!
//! ```rust,ignore
//! use portcullis::actions::LoginGate;
//! use portcullis::{InMemoryAttemptStore, PasswordVerifier};
//!
//! let gate = LoginGate::new(PasswordVerifier::new(users), tokens, InMemoryAttemptStore::new());
//! let response = gate.execute("user@example.com", &password).await?;
//! assert_eq!(response.token_type, "bearer");
//! ```

use std::fmt;

pub mod actions;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod repository;
pub mod throttle;

mod secret;

#[cfg(feature = "jwt")]
pub mod jwt;

#[cfg(feature = "axum_api")]
pub mod api;

#[cfg(feature = "sqlx_postgres")]
pub mod postgres;

#[cfg(feature = "sqlx_sqlite")]
pub mod sqlite;

pub use clock::{Clock, SystemClock};
pub use config::{PortcullisConfig, ThrottleConfig, TokenConfig};
pub use credentials::{CredentialVerifier, PasswordVerifier, Verification};
pub use repository::{
    AccessToken, AttemptRecord, AttemptStore, AuthUser, TokenRepository, UserRepository,
};
pub use secret::SecretString;
pub use throttle::{AttemptPolicy, AttemptState, AttemptTracker, InMemoryAttemptStore};

#[cfg(any(test, feature = "mocks"))]
pub use clock::MockClock;
#[cfg(any(test, feature = "mocks"))]
pub use repository::{MockAttemptStore, MockTokenRepository, MockUserRepository};

/// Token type reported to clients on a successful login.
pub const BEARER: &str = "bearer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown identifier or wrong secret. Deliberately does not say which.
    InvalidCredentials,
    /// The identifier is locked out; `retry_after` is in seconds and
    /// `message` is the configured lockout message.
    TooManyAttempts { retry_after: i64, message: String },
    PasswordHashError,
    TokenExpired,
    TokenInvalid,
    Validation(String),
    ConfigurationError(String),
    /// The backing store failed. Never reported as a credential or lockout error.
    DatabaseError(String),
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "wrong credentials"),
            AuthError::TooManyAttempts { message, .. } => write!(f, "{message}"),
            AuthError::PasswordHashError => write!(f, "Failed to hash password"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::Validation(msg) => write!(f, "Validation error: {msg}"),
            AuthError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            AuthError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
        }
    }
}

impl AuthError {
    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::TooManyAttempts { .. } => "TOO_MANY_ATTEMPTS",
            AuthError::PasswordHashError => "PASSWORD_HASH_ERROR",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::TokenInvalid => "TOKEN_INVALID",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            AuthError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_match_wire_format() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "wrong credentials");
        assert_eq!(
            AuthError::TooManyAttempts {
                retry_after: 10,
                message: "Too many request".to_owned(),
            }
            .to_string(),
            "Too many request"
        );
    }

    #[test]
    fn test_database_error_is_not_masked() {
        let err = AuthError::DatabaseError("connection reset".to_owned());
        assert_eq!(err.to_string(), "Database error: connection reset");
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}
