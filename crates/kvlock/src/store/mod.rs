//! Key-value store contract used by the lock
//!
//! The lock relies on three capabilities only:
//! - an atomic set-if-absent with a time-to-live
//! - a plain read
//! - an optimistic compare-and-delete that aborts without partial effect
//!   when the key no longer holds the expected value

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;

/// Result of a conditional transaction against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnOutcome {
    /// The transaction was applied
    Committed,
    /// The watched key changed before commit; nothing was applied
    Aborted,
}

/// Minimal store capability set required by `DistributedLock`
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set `key = value` only if `key` is absent, expiring after `ttl_seconds`.
    ///
    /// Returns whether the write took effect.
    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool>;

    /// Read the current value of `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Delete `key` only if it still holds `expected`
    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<TxnOutcome>;
}
