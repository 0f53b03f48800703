//! kvlock-redis - Redis-backed store for `kvlock`
//!
//! ```ignore
//! use std::sync::Arc;
//! use kvlock::DistributedLock;
//! use kvlock_redis::{RedisStore, RedisStoreConfig};
//!
//! let store = RedisStore::connect(&RedisStoreConfig::from_env()).await?;
//! let lock = DistributedLock::new(Arc::new(store));
//!
//! if lock.acquire("scheduler:retry-rollback", "10.0.0.5:8091", 30).await {
//!     // run the job
//!     lock.release("scheduler:retry-rollback", "10.0.0.5:8091").await;
//! }
//! ```

pub mod config;
pub mod store;

pub use config::RedisStoreConfig;
pub use store::{RedisStore, map_redis_error};
