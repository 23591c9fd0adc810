//! Finance State - conversation state storage
//!
//! Short-lived per-user records (an expense being entered, a pending prompt)
//! live in a key-value store and expire after a period of inactivity.
//!
//! - [`StateStore`]: the storage trait, with [`MemoryStateStore`] and
//!   `RedisStateStore` (feature `redis-backend`)
//! - [`JsonRepository`] / [`StatusRepository`]: typed access with per-operation timeouts
//! - [`KeyedLocks`]: per-user serialization of read-modify-write cycles

pub mod error;
pub mod keyspace;
pub mod locks;
pub mod memory;
#[cfg(feature = "redis-backend")]
pub mod redis_impl;
pub mod repository;
pub mod store;

pub use error::{Result, StoreError};
pub use keyspace::{scoped_key, KeySpace};
pub use locks::{KeyGuard, KeyedLocks};
pub use memory::MemoryStateStore;
#[cfg(feature = "redis-backend")]
pub use redis_impl::RedisStateStore;
pub use repository::{JsonRepository, StatusRepository, DEFAULT_OP_TIMEOUT};
pub use store::StateStore;
