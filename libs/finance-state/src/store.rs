//! State storage trait
//!
//! Conversation state (an in-flight expense entry, a pending status) is kept
//! in an external key-value store with an inactivity expiry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// TTL-bound key-value storage
///
/// Implementations can use Redis, in-memory storage, or other backends.
/// The store gives no isolation between racing writers; see [`crate::KeyedLocks`].
pub trait StateStore: Send + Sync {
    /// Get the value for a key; expired keys read as absent
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Replace the value for a key and restart its expiry
    fn set(&self, key: &str, value: &[u8], ttl: Duration)
        -> impl Future<Output = Result<()>> + Send;

    /// Delete a key (no error if absent)
    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

impl<S: StateStore> StateStore for Arc<S> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send {
        self.as_ref().get(key)
    }

    fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send {
        self.as_ref().set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        self.as_ref().delete(key)
    }
}
