//! In-memory HTTP session store with idle eviction.
//!
//! Records live in a [`moka`] cache whose time-to-idle matches the session
//! expiry, so abandoned sessions are dropped by the cache instead of
//! accumulating for the life of the process. Both web servers mount it behind
//! `tower_sessions::SessionManagerLayer`.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};

/// Session store backed by an idle-evicting cache.
#[derive(Clone)]
pub struct CachedSessionStore {
    records: Cache<Id, Record>,
}

impl std::fmt::Debug for CachedSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSessionStore")
            .field("entries", &self.records.entry_count())
            .finish()
    }
}

impl CachedSessionStore {
    /// Drop records untouched for `idle`.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            records: Cache::builder().time_to_idle(idle).build(),
        }
    }

    /// Approximate number of stored records.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.records.entry_count()
    }

    /// Apply pending evictions now instead of on the next cache write.
    pub async fn run_pending_tasks(&self) {
        self.records.run_pending_tasks().await;
    }
}

#[async_trait]
impl SessionStore for CachedSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let Some(record) = self.records.get(session_id).await else {
            return Ok(None);
        };
        if record.expiry_date <= OffsetDateTime::now_utc() {
            self.records.invalidate(session_id).await;
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use tower_sessions::cookie::time::Duration as CookieDuration;

    use super::*;

    fn record(expires_in: CookieDuration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_create_load_delete() {
        let store = CachedSessionStore::new(Duration::from_secs(60));
        let mut rec = record(CookieDuration::hours(1));
        store.create(&mut rec).await.unwrap();

        let loaded = store.load(&rec.id).await.unwrap();
        assert_eq!(loaded.map(|r| r.id), Some(rec.id));

        store.delete(&rec.id).await.unwrap();
        assert!(store.load(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_record_is_removed_on_load() {
        let store = CachedSessionStore::new(Duration::from_secs(60));
        let rec = record(CookieDuration::seconds(-1));
        store.save(&rec).await.unwrap();

        assert!(store.load(&rec.id).await.unwrap().is_none());
        store.run_pending_tasks().await;
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_idle_records_are_evicted() {
        let store = CachedSessionStore::new(Duration::from_millis(50));
        for _ in 0..10 {
            store.save(&record(CookieDuration::hours(1))).await.unwrap();
        }
        store.run_pending_tasks().await;
        assert_eq!(store.entry_count(), 10);

        tokio::time::sleep(Duration::from_millis(150)).await;
        store.run_pending_tasks().await;
        assert_eq!(store.entry_count(), 0);
    }
}
