use chrono::{DateTime, Utc};

use super::policy::AttemptPolicy;
use crate::{AttemptRecord, AttemptStore, AuthError};

/// Lockout state of one identifier, derived at decision time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// No failures in the current window.
    Clean,
    /// Some failures, still admitted.
    Accumulating { count: u32, remaining: u32 },
    /// Rejected without checking credentials until `retry_after` seconds pass.
    Blocked { count: u32, retry_after: i64 },
}

impl AttemptState {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    pub fn retry_after(&self) -> Option<i64> {
        match self {
            Self::Blocked { retry_after, .. } => Some(*retry_after),
            Self::Clean | Self::Accumulating { .. } => None,
        }
    }
}

/// Brute-force policy over an [`AttemptStore`].
///
/// Expiry is lazy: nothing sweeps the store. A blocked identifier is
/// unlocked by the first decision made after its cooldown has passed.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use portcullis::{AttemptPolicy, AttemptTracker, InMemoryAttemptStore};
///
/// # #[tokio::main]
/// # async fn main() {
/// let tracker = AttemptTracker::with_policy(
///     InMemoryAttemptStore::new(),
///     AttemptPolicy::cooldown_hours(5, 24),
/// );
/// let now = Utc::now();
/// for _ in 0..5 {
///     tracker.register_failure("user@example.com", now).await.unwrap();
/// }
/// assert!(tracker.is_blocked("user@example.com", now).await.unwrap());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AttemptTracker<S: AttemptStore> {
    store: S,
    policy: AttemptPolicy,
}

impl<S: AttemptStore> AttemptTracker<S> {
    /// Tracker with the default policy (5 attempts, 24 hour cooldown).
    pub fn new(store: S) -> Self {
        Self::with_policy(store, AttemptPolicy::default())
    }

    pub fn with_policy(store: S, policy: AttemptPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &AttemptPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current state without side effects.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, identifier), err))]
    pub async fn state(&self, identifier: &str, now: DateTime<Utc>) -> Result<AttemptState, AuthError> {
        Ok(self
            .store
            .get(identifier)
            .await?
            .map_or(AttemptState::Clean, |record| self.policy.classify(&record, now)))
    }

    /// Admission decision. Unlocks stale records on the way.
    ///
    /// Once `now - last_try >= cooldown` the stored count is reset to zero, so
    /// the next failure starts a fresh window.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, identifier), err))]
    pub async fn check(&self, identifier: &str, now: DateTime<Utc>) -> Result<AttemptState, AuthError> {
        let Some(record) = self.store.get(identifier).await? else {
            return Ok(AttemptState::Clean);
        };

        let stale_before = self.policy.stale_before(now);
        if record.count > 0 && record.is_stale(stale_before) {
            let reset = self.store.reset_stale(identifier, stale_before).await?;
            if reset && record.count >= self.policy.max_attempts {
                log::info!(target: "portcullis", "msg=\"lockout expired\", attempts={}", record.count);
            }
            if !reset {
                // a failure landed between the read and the reset
                return self.state(identifier, now).await;
            }
            return Ok(AttemptState::Clean);
        }

        Ok(self.policy.classify(&record, now))
    }

    pub async fn is_blocked(&self, identifier: &str, now: DateTime<Utc>) -> Result<bool, AuthError> {
        Ok(self.check(identifier, now).await?.is_blocked())
    }

    /// Counts one failed login. Atomic per identifier.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, identifier), err))]
    pub async fn register_failure(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<AttemptRecord, AuthError> {
        let record = self
            .store
            .increment(identifier, now, self.policy.stale_before(now))
            .await?;

        if record.count == self.policy.max_attempts {
            log::warn!(
                target: "portcullis",
                "msg=\"identifier locked out\", attempts={}, cooldown_secs={}",
                record.count,
                self.policy.cooldown.num_seconds()
            );
        }

        Ok(record)
    }

    /// Clears the record after a successful login.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, identifier), err))]
    pub async fn register_success(&self, identifier: &str) -> Result<(), AuthError> {
        self.store.delete(identifier).await
    }

    /// Failures still allowed before the identifier is blocked.
    pub async fn remaining(&self, identifier: &str, now: DateTime<Utc>) -> Result<u32, AuthError> {
        Ok(match self.state(identifier, now).await? {
            AttemptState::Clean => self.policy.max_attempts,
            AttemptState::Accumulating { remaining, .. } => remaining,
            AttemptState::Blocked { .. } => 0,
        })
    }

    /// Seconds until a blocked identifier is let back in.
    pub async fn retry_after(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, AuthError> {
        Ok(self.state(identifier, now).await?.retry_after())
    }
}
