//! Credential verification consumed by the login gate.

use async_trait::async_trait;

use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::{AuthError, AuthUser, SecretString, UserRepository};

/// Outcome of checking an identifier/secret pair.
///
/// An unknown identifier and a wrong secret both map to `Rejected`.
#[derive(Debug, Clone)]
pub enum Verification {
    Verified(AuthUser),
    Rejected,
}

#[async_trait]
pub trait CredentialVerifier {
    /// `Err` is reserved for infrastructure faults, never for bad credentials.
    async fn verify(
        &self,
        identifier: &str,
        secret: &SecretString,
    ) -> Result<Verification, AuthError>;
}

/// Looks the user up by email and checks the stored password hash.
#[derive(Debug, Clone)]
pub struct PasswordVerifier<U, H = Argon2Hasher> {
    users: U,
    hasher: H,
}

impl<U: UserRepository> PasswordVerifier<U> {
    pub fn new(users: U) -> Self {
        Self::with_hasher(users, Argon2Hasher::default())
    }
}

impl<U: UserRepository, H: PasswordHasher> PasswordVerifier<U, H> {
    pub fn with_hasher(users: U, hasher: H) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl<U, H> CredentialVerifier for PasswordVerifier<U, H>
where
    U: UserRepository + Send + Sync,
    H: PasswordHasher,
{
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "verify_credentials", skip_all, err)
    )]
    async fn verify(
        &self,
        identifier: &str,
        secret: &SecretString,
    ) -> Result<Verification, AuthError> {
        let Some(user) = self.users.find_user_by_email(identifier).await? else {
            return Ok(Verification::Rejected);
        };

        if self
            .hasher
            .verify(secret.expose_secret(), &user.hashed_password)?
        {
            Ok(Verification::Verified(user))
        } else {
            Ok(Verification::Rejected)
        }
    }
}
