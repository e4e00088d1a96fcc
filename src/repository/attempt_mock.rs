#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::AuthError;

use super::attempt::{AttemptRecord, AttemptStore};

/// Test double for [`AttemptStore`]. Clones share state, so a test can keep
/// a handle and rewrite records behind the tracker's back.
#[derive(Clone, Default)]
pub struct MockAttemptStore {
    pub records: Arc<Mutex<Vec<AttemptRecord>>>,
    failing: Arc<AtomicBool>,
}

impl MockAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call return `AuthError::DatabaseError`.
    pub fn fail_with_database_error(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), AuthError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::DatabaseError("mock store unavailable".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl AttemptStore for MockAttemptStore {
    async fn get(&self, identifier: &str) -> Result<Option<AttemptRecord>, AuthError> {
        self.check()?;
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.identifier == identifier).cloned())
    }

    async fn upsert(&self, record: &AttemptRecord) -> Result<(), AuthError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.identifier == record.identifier) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        drop(records);
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<(), AuthError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        records.retain(|r| r.identifier != identifier);
        drop(records);
        Ok(())
    }

    async fn increment(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<AttemptRecord, AuthError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let record = if let Some(existing) = records.iter_mut().find(|r| r.identifier == identifier)
        {
            existing.count = if existing.is_stale(stale_before) {
                1
            } else {
                existing.count.saturating_add(1)
            };
            existing.last_try = now;
            existing.clone()
        } else {
            let created = AttemptRecord::new(identifier, 1, now);
            records.push(created.clone());
            created
        };
        drop(records);
        Ok(record)
    }

    async fn reset_stale(
        &self,
        identifier: &str,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let reset = match records
            .iter_mut()
            .find(|r| r.identifier == identifier && r.is_stale(stale_before))
        {
            Some(record) => {
                record.count = 0;
                true
            }
            None => false,
        };
        drop(records);
        Ok(reset)
    }
}
