use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Consecutive failed logins for one identifier.
///
/// Whether the identifier is blocked is never stored; it is derived from
/// `count` and `last_try` at decision time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub identifier: String,
    pub count: u32,
    /// Time of the most recent failure. Successful logins never touch it.
    pub last_try: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn new(identifier: impl Into<String>, count: u32, last_try: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.into(),
            count,
            last_try,
        }
    }

    /// True once `last_try` is at or before `stale_before`.
    pub fn is_stale(&self, stale_before: DateTime<Utc>) -> bool {
        self.last_try <= stale_before
    }
}

/// Keyed storage for [`AttemptRecord`]s, at most one per identifier.
///
/// `increment` and `reset_stale` must be atomic per identifier: concurrent
/// failures for the same identifier may never lose an increment.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn get(&self, identifier: &str) -> Result<Option<AttemptRecord>, AuthError>;

    /// Creates or replaces the record, writing `count` and `last_try` together.
    async fn upsert(&self, record: &AttemptRecord) -> Result<(), AuthError>;

    async fn delete(&self, identifier: &str) -> Result<(), AuthError>;

    /// Records one failure at `now` and returns the updated record.
    ///
    /// Creates the record with a count of 1 if it doesn't exist. A record whose
    /// `last_try` is at or before `stale_before` restarts at 1.
    async fn increment(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<AttemptRecord, AuthError>;

    /// Zeroes the count only if `last_try` is at or before `stale_before`.
    ///
    /// Returns whether a record was reset. A failure recorded after
    /// `stale_before` keeps the record untouched.
    async fn reset_stale(
        &self,
        identifier: &str,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, AuthError>;
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_is_stale_is_inclusive() {
        let now = Utc::now();
        let record = AttemptRecord::new("user@example.com", 5, now);

        assert!(record.is_stale(now));
        assert!(record.is_stale(now + Duration::seconds(1)));
        assert!(!record.is_stale(now - Duration::seconds(1)));
    }
}
