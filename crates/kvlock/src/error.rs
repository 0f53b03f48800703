//! Error types for key-value store access
//!
//! Store failures never reach callers of the boolean lock API. They are
//! carried inside `AcquireOutcome::Unknown` / `ReleaseOutcome::Unknown` for
//! callers that need to tell "not held" apart from "could not ask".

/// Failures reported by a `KeyValueStore`
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connection refused, dropped or otherwise unusable
    #[error("connection error: {0}")]
    Connection(String),

    /// Request did not complete within the client timeout
    #[error("request timed out")]
    Timeout,

    /// Unexpected reply or malformed response
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Any other failure raised by the backing store
    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the failure happened before the store could answer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
