// In-memory key-value store with per-key expiry
// Backs tests and single-process deployments with the same contract as a remote store

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use super::{KeyValueStore, TxnOutcome};
use crate::error::{Result, StoreError};

const MIN_REAP_INTERVAL: Duration = Duration::from_millis(1);

/// A stored value with its expiry deadline
struct LeaseEntry {
    value: String,
    expires_at: Instant,
}

impl LeaseEntry {
    fn new(value: &str, expires_at: Instant) -> Self {
        Self {
            value: value.to_string(),
            expires_at,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// DashMap-backed store
///
/// Expired entries are invisible to every operation and removed lazily, or
/// eagerly by `purge_expired` / `spawn_reaper`. Deadlines follow the tokio
/// clock, so paused-time tests can advance past a ttl without sleeping.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, LeaseEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time left before `key` expires, `None` if absent or already expired
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at - now)
    }

    /// Remove every expired entry, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let live = !entry.is_expired(now);
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    /// Start a background task purging expired entries every `interval`.
    ///
    /// Intervals shorter than 1ms (including zero) are raised to 1ms.
    /// The task ends once the last strong reference to the store is dropped.
    pub fn spawn_reaper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);
        let interval = interval.max(MIN_REAP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let removed = store.purge_expired();
                if removed > 0 {
                    debug!(count = removed, "Purged expired lease entries");
                }
            }
        })
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool> {
        let now = Instant::now();
        // Zero or a deadline past the clock's range is refused, like Redis does for EX
        let expires_at = match now.checked_add(Duration::from_secs(ttl_seconds)) {
            Some(expires_at) if ttl_seconds > 0 => expires_at,
            _ => {
                return Err(StoreError::Protocol(
                    "invalid expire time in set".to_string(),
                ));
            }
        };

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(LeaseEntry::new(value, expires_at));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(LeaseEntry::new(value, expires_at));
                Ok(true)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let value = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => None,
            None => return Ok(None),
        };
        // The read guard is released above; drop the stale entry
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(value)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<TxnOutcome> {
        let now = Instant::now();
        let removed = self
            .entries
            .remove_if(key, |_, entry| !entry.is_expired(now) && entry.value == expected);

        Ok(match removed {
            Some(_) => TxnOutcome::Committed,
            None => TxnOutcome::Aborted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_if_absent_is_exclusive() {
        let store = MemoryStore::new();

        assert!(store.set_if_absent("k", "a", 10).await.unwrap());
        assert!(!store.set_if_absent("k", "b", 10).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("a".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_rejected() {
        let store = MemoryStore::new();

        let err = store.set_if_absent("k", "a", 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Protocol(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_rejected() {
        let store = MemoryStore::new();

        let err = store.set_if_absent("k", "a", u64::MAX).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Protocol("invalid expire time in set".to_string())
        );
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_absent_and_reclaimable() {
        let store = MemoryStore::new();
        assert!(store.set_if_absent("k", "a", 1).await.unwrap());

        tokio::time::advance(Duration::from_millis(1001)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.set_if_absent("k", "b", 1).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some("b".to_string()));
    }

    #[tokio::test]
    async fn test_compare_and_delete() {
        let store = MemoryStore::new();
        store.set_if_absent("k", "a", 10).await.unwrap();

        // Wrong value leaves the entry alone
        assert_eq!(
            store.compare_and_delete("k", "b").await.unwrap(),
            TxnOutcome::Aborted
        );
        assert_eq!(store.get("k").await.unwrap(), Some("a".to_string()));

        assert_eq!(
            store.compare_and_delete("k", "a").await.unwrap(),
            TxnOutcome::Committed
        );
        assert_eq!(store.get("k").await.unwrap(), None);

        // Absent key
        assert_eq!(
            store.compare_and_delete("k", "a").await.unwrap(),
            TxnOutcome::Aborted
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_compare_and_delete_skips_expired_entry() {
        let store = MemoryStore::new();
        store.set_if_absent("k", "a", 1).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(
            store.compare_and_delete("k", "a").await.unwrap(),
            TxnOutcome::Aborted
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_ttl_and_purge() {
        let store = MemoryStore::new();
        store.set_if_absent("short", "a", 1).await.unwrap();
        store.set_if_absent("long", "b", 60).await.unwrap();

        assert_eq!(store.remaining_ttl("short"), Some(Duration::from_secs(1)));
        assert_eq!(store.remaining_ttl("missing"), None);

        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(store.remaining_ttl("short"), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.purge_expired(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_purges_in_background() {
        let store = Arc::new(MemoryStore::new());
        store.set_if_absent("k", "a", 1).await.unwrap();
        let handle = store.spawn_reaper(Duration::from_millis(500));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.purge_expired(), 0);

        drop(store);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_with_zero_interval() {
        let store = Arc::new(MemoryStore::new());
        store.set_if_absent("k", "a", 1).await.unwrap();
        let handle = store.spawn_reaper(Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(!handle.is_finished());
        assert_eq!(store.purge_expired(), 0);

        handle.abort();
    }
}
