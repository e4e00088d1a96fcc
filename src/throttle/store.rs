use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::{AttemptRecord, AttemptStore, AuthError};

/// Process-local attempt store.
///
/// Records live in a sharded map, so identifiers on different shards never
/// wait on each other and every operation on one identifier holds that
/// entry's lock for its whole read-modify-write. For several processes, use
/// a shared store such as postgres.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAttemptStore {
    records: Arc<DashMap<String, AttemptRecord>>,
}

impl InMemoryAttemptStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops records whose last failure is at or before `stale_before`.
    ///
    /// Those records already classify as clean, so this only bounds memory.
    pub fn prune_stale(&self, stale_before: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_stale(stale_before));
        before.saturating_sub(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn get(&self, identifier: &str) -> Result<Option<AttemptRecord>, AuthError> {
        Ok(self.records.get(identifier).map(|r| r.value().clone()))
    }

    async fn upsert(&self, record: &AttemptRecord) -> Result<(), AuthError> {
        self.records.insert(record.identifier.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<(), AuthError> {
        self.records.remove(identifier);
        Ok(())
    }

    async fn increment(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<AttemptRecord, AuthError> {
        let record = match self.records.entry(identifier.to_owned()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.count = if record.is_stale(stale_before) {
                    // window expired, start a new one
                    1
                } else {
                    record.count.saturating_add(1)
                };
                record.last_try = now;
                record.clone()
            }
            Entry::Vacant(entry) => {
                let record = AttemptRecord::new(identifier, 1, now);
                entry.insert(record.clone());
                record
            }
        };

        Ok(record)
    }

    async fn reset_stale(
        &self,
        identifier: &str,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        let Some(mut record) = self.records.get_mut(identifier) else {
            return Ok(false);
        };

        if record.is_stale(stale_before) {
            record.count = 0;
            return Ok(true);
        }
        Ok(false)
    }
}
