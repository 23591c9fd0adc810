//! In-memory state store
//!
//! DashMap-backed store for tests and single-process runs. Expired entries
//! read as absent and are dropped lazily on access, by [`MemoryStateStore::purge_expired`],
//! or periodically by [`MemoryStateStore::spawn_purge`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};
use tracing::{debug, trace};

use crate::error::Result;
use crate::store::StateStore;

#[derive(Debug, Clone)]
struct StoredValue {
    data: Vec<u8>,
    expires_at: Instant,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory TTL store
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    data: DashMap<String, StoredValue>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remaining lifetime of a live key
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.data
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now)
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.data.len();
        self.data.retain(|_, entry| entry.is_live(now));
        let removed = before.saturating_sub(self.data.len());
        if removed > 0 {
            trace!("Purged {} expired state entries", removed);
        }
        removed
    }

    /// Run [`purge_expired`](Self::purge_expired) every `every` on a background task
    ///
    /// The task holds a weak handle and ends once the store is dropped.
    pub fn spawn_purge(store: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(store);
        let every = every.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut timer = interval(every);
            // First tick completes immediately
            timer.tick().await;
            loop {
                timer.tick().await;
                let Some(store) = weak.upgrade() else {
                    debug!("State store dropped, purge task exiting");
                    break;
                };
                store.purge_expired();
            }
        })
    }

    fn read(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        // The read guard must be released before remove_if touches the same shard
        let hit = self
            .data
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.data.clone()));

        match hit {
            Some(Some(data)) => Some(data),
            Some(None) => {
                self.data.remove_if(key, |_, entry| !entry.is_live(now));
                None
            },
            None => None,
        }
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send {
        let value = self.read(key);
        async move { Ok(value) }
    }

    fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send {
        self.data.insert(
            key.to_string(),
            StoredValue {
                data: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        async { Ok(()) }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        self.data.remove(key);
        async { Ok(()) }
    }
}
