//! Distributed lock
//!
//! This module provides:
//! - Lock request and outcome types
//! - Store-backed acquire/release
//! - The `DistributedLocker` abstraction with a no-op implementation

mod model;
mod service;

pub use model::*;
pub use service::*;
