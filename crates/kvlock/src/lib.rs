//! kvlock - expiry-bounded distributed lock over a shared key-value store
//!
//! This crate provides:
//! - `KeyValueStore`: the store contract (set-if-absent with ttl, get,
//!   compare-and-delete)
//! - `MemoryStore`: an in-process implementation of that contract
//! - `DistributedLock`: acquire/release with ownership tokens
//! - `LockConfig`: settings and locker construction
//!
//! The boolean API is fail-safe: a failed or unknown acquire reads as
//! "not held", and release always reports success, deferring to the lease
//! ttl when the store cannot be reached. `try_acquire` / `try_release`
//! expose the underlying outcome.

pub mod config;
pub mod error;
pub mod lock;
pub mod metrics;
pub mod store;

pub use config::LockConfig;
pub use error::{Result, StoreError};
pub use lock::{
    AcquireOutcome, DistributedLock, DistributedLocker, LockRequest, NoopLocker, ReleaseOutcome,
};
pub use metrics::describe_metrics;
pub use store::{KeyValueStore, MemoryStore, TxnOutcome};
