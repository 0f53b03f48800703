//! Lock request and outcome types

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Outcome of a single acquisition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The lease was written; the caller holds the lock until release or ttl
    Acquired,
    /// Another live lease is present
    Held,
    /// Empty key or token, or zero ttl; the store was not contacted
    Rejected,
    /// The store could not be reached or answered with an error
    Unknown(StoreError),
}

impl AcquireOutcome {
    /// Only a confirmed write counts as holding the lock
    pub fn is_acquired(&self) -> bool {
        matches!(self, Self::Acquired)
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Acquired => "acquired",
            Self::Held => "held",
            Self::Rejected => "rejected",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Outcome of a release attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Our lease was deleted
    Released,
    /// The key is absent or held by another token; nothing was deleted
    NotHeld,
    /// The key changed between the read and the conditional delete
    Superseded,
    /// The store could not be reached; the lease may still be live
    Unknown(StoreError),
}

impl ReleaseOutcome {
    /// Whether the store confirmed the caller no longer holds the lease.
    ///
    /// `Unknown` means the lease may still be live and will only disappear
    /// once its ttl runs out.
    pub fn is_confirmed(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Released => "released",
            Self::NotHeld => "not_held",
            Self::Superseded => "superseded",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// A lock acquisition request as passed between coordinators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    /// Lock key
    pub key: String,
    /// Ownership token of the requester
    pub value: String,
    /// Lease duration in seconds
    #[serde(default = "default_expire_seconds")]
    pub expire_seconds: u64,
}

/// Lease duration used when a request does not name one
pub const DEFAULT_EXPIRE_SECONDS: u64 = 30;

fn default_expire_seconds() -> u64 {
    DEFAULT_EXPIRE_SECONDS
}

impl LockRequest {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            expire_seconds: DEFAULT_EXPIRE_SECONDS,
        }
    }

    pub fn with_expire_seconds(mut self, expire_seconds: u64) -> Self {
        self.expire_seconds = expire_seconds;
        self
    }
}
