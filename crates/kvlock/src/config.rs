// Lock configuration
// Deserialized from the host application's settings; every field has a default

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lock::{
    DEFAULT_EXPIRE_SECONDS, DistributedLock, DistributedLocker, LockRequest, NoopLocker,
};
use crate::store::KeyValueStore;

/// Settings for distributed locking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LockConfig {
    /// When false every lock request is granted locally
    pub enabled: bool,

    /// Lease duration used by `request` (default: 30s)
    pub default_ttl_seconds: u64,

    /// Prepended to every lock name, e.g. "scheduler:"
    pub key_prefix: String,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_seconds: DEFAULT_EXPIRE_SECONDS,
            key_prefix: String::new(),
        }
    }
}

impl LockConfig {
    /// Store key for the lock called `name`
    pub fn lock_key(&self, name: &str) -> String {
        format!("{}{}", self.key_prefix, name)
    }

    /// Request for `name` held by `token` with the default ttl
    pub fn request(&self, name: &str, token: impl Into<String>) -> LockRequest {
        LockRequest::new(self.lock_key(name), token).with_expire_seconds(self.default_ttl_seconds)
    }

    /// Build the locker matching this configuration
    pub fn locker(&self, store: Arc<dyn KeyValueStore>) -> Arc<dyn DistributedLocker> {
        if self.enabled {
            Arc::new(DistributedLock::new(store))
        } else {
            Arc::new(NoopLocker)
        }
    }
}
