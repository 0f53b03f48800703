//! Distributed lock over a shared key-value store
//!
//! Acquire is a single atomic set-if-absent with a ttl; there is no retry and
//! no backoff, callers decide their own schedule. Release reads the lease and
//! deletes it through the store's compare-and-delete only while it still
//! holds the caller's token, so an expired-and-reacquired lease is never
//! removed on behalf of its previous owner.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::model::{AcquireOutcome, LockRequest, ReleaseOutcome};
use crate::metrics::{record_acquire, record_release};
use crate::store::{KeyValueStore, TxnOutcome};

/// Lock operations as seen by coordination code
#[async_trait]
pub trait DistributedLocker: Send + Sync {
    /// Try once to take the lock described by `request`
    async fn acquire_lock(&self, request: &LockRequest) -> bool;

    /// Give up the lock described by `request`
    async fn release_lock(&self, request: &LockRequest) -> bool;
}

/// Store-backed lock
///
/// Holds nothing but the store handle; every decision is made by the store.
#[derive(Clone)]
pub struct DistributedLock {
    store: Arc<dyn KeyValueStore>,
}

impl DistributedLock {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Acquire `key` for `token`, returning whether the lease was written.
    ///
    /// Store failures count as "not acquired".
    pub async fn acquire(&self, key: &str, token: &str, ttl_seconds: u64) -> bool {
        self.try_acquire(key, token, ttl_seconds)
            .await
            .is_acquired()
    }

    /// Release `key` if it is still held by `token`.
    ///
    /// Always returns `true`: a lease that moved on is no longer ours, and
    /// one we could not reach will expire with its ttl. Use `try_release`
    /// to tell those cases apart.
    pub async fn release(&self, key: &str, token: &str) -> bool {
        self.try_release(key, token).await;
        true
    }

    pub async fn try_acquire(&self, key: &str, token: &str, ttl_seconds: u64) -> AcquireOutcome {
        let outcome = if key.is_empty() || token.is_empty() || ttl_seconds == 0 {
            warn!(
                key = %key,
                token = %token,
                ttl_seconds,
                "Rejected lock acquisition with empty key, empty token or zero ttl"
            );
            AcquireOutcome::Rejected
        } else {
            match self.store.set_if_absent(key, token, ttl_seconds).await {
                Ok(true) => AcquireOutcome::Acquired,
                Ok(false) => AcquireOutcome::Held,
                Err(e) => {
                    warn!(
                        key = %key,
                        token = %token,
                        error = %e,
                        "Failed to acquire distributed lock"
                    );
                    AcquireOutcome::Unknown(e)
                }
            }
        };

        debug!(key = %key, token = %token, outcome = outcome.as_label(), "Lock acquire");
        record_acquire(&outcome);
        outcome
    }

    pub async fn try_release(&self, key: &str, token: &str) -> ReleaseOutcome {
        let outcome = if key.is_empty() || token.is_empty() {
            warn!(
                key = %key,
                token = %token,
                "Rejected lock release with empty key or empty token"
            );
            ReleaseOutcome::NotHeld
        } else {
            self.release_if_owner(key, token).await
        };

        if let ReleaseOutcome::Unknown(e) = &outcome {
            warn!(
                key = %key,
                token = %token,
                error = %e,
                "Failed to release distributed lock, leaving it to expire"
            );
        }

        debug!(key = %key, token = %token, outcome = outcome.as_label(), "Lock release");
        record_release(&outcome);
        outcome
    }

    async fn release_if_owner(&self, key: &str, token: &str) -> ReleaseOutcome {
        let current = match self.store.get(key).await {
            Ok(current) => current,
            Err(e) => return ReleaseOutcome::Unknown(e),
        };

        // Absent (expired) or re-acquired by someone else: nothing of ours to delete
        if current.as_deref() != Some(token) {
            return ReleaseOutcome::NotHeld;
        }

        match self.store.compare_and_delete(key, token).await {
            Ok(TxnOutcome::Committed) => ReleaseOutcome::Released,
            Ok(TxnOutcome::Aborted) => ReleaseOutcome::Superseded,
            Err(e) => ReleaseOutcome::Unknown(e),
        }
    }
}

#[async_trait]
impl DistributedLocker for DistributedLock {
    async fn acquire_lock(&self, request: &LockRequest) -> bool {
        self.acquire(&request.key, &request.value, request.expire_seconds)
            .await
    }

    async fn release_lock(&self, request: &LockRequest) -> bool {
        self.release(&request.key, &request.value).await
    }
}

/// Locker that grants every request
///
/// Used when distributed locking is disabled, e.g. a single-node deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLocker;

#[async_trait]
impl DistributedLocker for NoopLocker {
    async fn acquire_lock(&self, _request: &LockRequest) -> bool {
        true
    }

    async fn release_lock(&self, _request: &LockRequest) -> bool {
        true
    }
}
