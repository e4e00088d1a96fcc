use std::fmt;

use crate::AuthError;

/// Minimum required length for the signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// HS256 signing settings. Token lifetime comes from the login gate's
/// [`TokenConfig`](crate::TokenConfig).
#[derive(Clone)]
pub struct JwtConfig {
    pub(crate) secret: String,
    pub(crate) issuer: Option<String>,
    pub(crate) audience: Option<String>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtConfig {
    /// # Errors
    ///
    /// Returns `AuthError::ConfigurationError` if the secret is shorter than 32 bytes.
    pub fn new(secret: impl Into<String>) -> Result<Self, AuthError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::ConfigurationError(format!(
                "JWT secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        Ok(Self {
            secret,
            issuer: None,
            audience: None,
        })
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_too_short() {
        let err = JwtConfig::new("short").unwrap_err();
        assert!(
            matches!(err, AuthError::ConfigurationError(ref msg) if msg.contains("32 bytes")),
            "expected ConfigurationError mentioning 32 bytes"
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = JwtConfig::new("test-secret-32-bytes-long-key-01").unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-secret"));
    }
}
