use chrono::{DateTime, Duration, Utc};

use crate::config::{ThrottleConfig, DEFAULT_LOCKOUT_MESSAGE};
use crate::AttemptRecord;

use super::tracker::AttemptState;

/// Flat lockout policy: `max_attempts` failures block an identifier until
/// `cooldown` has passed since its last failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptPolicy {
    pub(crate) max_attempts: u32,
    pub(crate) cooldown: Duration,
    pub(crate) message: Option<String>,
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self::new(5, Duration::hours(24))
    }
}

impl AttemptPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, cooldown: Duration) -> Self {
        Self {
            max_attempts,
            cooldown,
            message: None,
        }
    }

    #[must_use]
    pub fn cooldown_minutes(max_attempts: u32, minutes: i64) -> Self {
        Self::new(max_attempts, Duration::minutes(minutes))
    }

    #[must_use]
    pub fn cooldown_hours(max_attempts: u32, hours: i64) -> Self {
        Self::new(max_attempts, Duration::hours(hours))
    }

    #[must_use]
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn get_message(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_LOCKOUT_MESSAGE)
    }

    /// Failures at or before this instant no longer count against `now`.
    pub fn stale_before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.cooldown
    }

    /// Classifies a stored record at `now`. Pure; never touches storage.
    pub fn classify(&self, record: &AttemptRecord, now: DateTime<Utc>) -> AttemptState {
        if record.count == 0 || record.is_stale(self.stale_before(now)) {
            return AttemptState::Clean;
        }

        if record.count < self.max_attempts {
            return AttemptState::Accumulating {
                count: record.count,
                remaining: self.max_attempts - record.count,
            };
        }

        let unlock_in = record.last_try + self.cooldown - now;
        // round up so a client never retries a moment too early
        let retry_after = (unlock_in.num_milliseconds() + 999) / 1000;

        AttemptState::Blocked {
            count: record.count,
            retry_after: retry_after.max(1),
        }
    }
}

impl From<&ThrottleConfig> for AttemptPolicy {
    fn from(config: &ThrottleConfig) -> Self {
        Self::new(config.max_attempts, config.cooldown).message(config.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(count: u32, last_try: DateTime<Utc>) -> AttemptRecord {
        AttemptRecord::new("user@example.com", count, last_try)
    }

    #[test]
    fn test_default_policy() {
        let policy = AttemptPolicy::default();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.cooldown(), Duration::hours(24));
        assert_eq!(policy.get_message(), "Too many request");
    }

    #[test]
    fn test_policy_builder() {
        let policy = AttemptPolicy::cooldown_minutes(3, 30).message("Account locked");
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.cooldown(), Duration::minutes(30));
        assert_eq!(policy.get_message(), "Account locked");
    }

    #[test]
    fn test_policy_from_config() {
        let config = ThrottleConfig {
            message: "Account locked".to_owned(),
            ..ThrottleConfig::default()
        };
        assert_eq!(
            AttemptPolicy::from(&config),
            AttemptPolicy::default().message("Account locked")
        );
    }

    #[test]
    fn test_classify_threshold_is_inclusive() {
        let policy = AttemptPolicy::default();
        let now = Utc::now();

        assert_eq!(
            policy.classify(&record(4, now), now),
            AttemptState::Accumulating {
                count: 4,
                remaining: 1
            }
        );
        assert!(policy.classify(&record(5, now), now).is_blocked());
    }

    #[test]
    fn test_classify_cooldown_boundary() {
        let policy = AttemptPolicy::default();
        let last_try = Utc::now();

        let just_before = last_try + Duration::hours(24) - Duration::seconds(1);
        assert_eq!(
            policy.classify(&record(5, last_try), just_before),
            AttemptState::Blocked {
                count: 5,
                retry_after: 1
            }
        );

        let exactly = last_try + Duration::hours(24);
        assert_eq!(policy.classify(&record(5, last_try), exactly), AttemptState::Clean);
    }

    #[test]
    fn test_classify_zero_count_is_clean() {
        let policy = AttemptPolicy::default();
        let now = Utc::now();
        assert_eq!(policy.classify(&record(0, now), now), AttemptState::Clean);
    }
}
