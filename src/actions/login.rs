use std::sync::Arc;

use crate::config::PortcullisConfig;
use crate::credentials::{CredentialVerifier, Verification};
use crate::throttle::{AttemptPolicy, AttemptState, AttemptTracker};
use crate::{
    AccessToken, AttemptStore, AuthError, AuthUser, Clock, SecretString, SystemClock,
    TokenRepository, BEARER,
};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub user: AuthUser,
    pub token: AccessToken,
    /// Always `"bearer"`.
    pub token_type: &'static str,
}

/// Runs one login request through the lockout policy.
///
/// 1. A blocked identifier fails with [`AuthError::TooManyAttempts`] before
///    credentials are looked at.
/// 2. Rejected credentials count as a failure and fail with
///    [`AuthError::InvalidCredentials`].
/// 3. Verified credentials clear the record and get a bearer token.
pub struct LoginGate<V: CredentialVerifier, T: TokenRepository, S: AttemptStore> {
    verifier: V,
    token_repository: T,
    tracker: AttemptTracker<S>,
    config: PortcullisConfig,
    clock: Arc<dyn Clock>,
}

impl<V: CredentialVerifier, T: TokenRepository, S: AttemptStore> LoginGate<V, T, S> {
    pub fn new(verifier: V, token_repository: T, attempt_store: S) -> Self {
        Self::with_config(
            verifier,
            token_repository,
            attempt_store,
            PortcullisConfig::default(),
        )
    }

    pub fn with_config(
        verifier: V,
        token_repository: T,
        attempt_store: S,
        config: PortcullisConfig,
    ) -> Self {
        let tracker =
            AttemptTracker::with_policy(attempt_store, AttemptPolicy::from(&config.throttle));
        Self {
            verifier,
            token_repository,
            tracker,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn tracker(&self) -> &AttemptTracker<S> {
        &self.tracker
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(name = "login", skip_all, err))]
    pub async fn execute(
        &self,
        identifier: &str,
        secret: &SecretString,
    ) -> Result<LoginResponse, AuthError> {
        let now = self.clock.now();

        if let AttemptState::Blocked { retry_after, .. } = self.tracker.check(identifier, now).await?
        {
            log::warn!(
                target: "portcullis",
                "msg=\"login rejected\", reason=\"locked out\", retry_after={retry_after}"
            );
            return Err(AuthError::TooManyAttempts {
                retry_after,
                message: self.tracker.policy().get_message().to_owned(),
            });
        }

        let user = match self.verifier.verify(identifier, secret).await? {
            Verification::Verified(user) => user,
            Verification::Rejected => {
                let record = self.tracker.register_failure(identifier, now).await?;
                log::info!(
                    target: "portcullis",
                    "msg=\"login failed\", attempts={}",
                    record.count
                );
                return Err(AuthError::InvalidCredentials);
            }
        };

        self.tracker.register_success(identifier).await?;

        let expires_at = now + self.config.tokens.access_token_expiry;
        let token = self
            .token_repository
            .create_token(user.id, expires_at)
            .await?;

        log::info!(target: "portcullis", "msg=\"login succeeded\", user_id={}", user.id);

        Ok(LoginResponse {
            user,
            token,
            token_type: BEARER,
        })
    }
}
