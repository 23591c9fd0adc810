//! Typed repositories over a [`StateStore`]
//!
//! Each operation is bounded by a timeout so a stalled backend surfaces as
//! [`StoreError::Timeout`] instead of hanging the caller.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{Result, StoreError};
use crate::keyspace::scoped_key;
use crate::store::StateStore;

/// Default per-operation timeout
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

async fn bounded<F, R>(limit: Duration, op: &str, key: &str, fut: F) -> Result<R>
where
    F: Future<Output = Result<R>>,
{
    let start = Instant::now();
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => {
            debug!("{} {} in {:?}", op, key, start.elapsed());
            result
        },
        Err(_) => {
            error!("{} {} timed out after {:?}", op, key, limit);
            Err(StoreError::timeout(format!(
                "{} {} exceeded {:?}",
                op, key, limit
            )))
        },
    }
}

/// JSON-serialized records under `<prefix>:<id>`
#[derive(Debug)]
pub struct JsonRepository<S, T> {
    store: Arc<S>,
    prefix: String,
    ttl: Duration,
    op_timeout: Duration,
    _record: PhantomData<fn() -> T>,
}

impl<S, T> Clone for JsonRepository<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            prefix: self.prefix.clone(),
            ttl: self.ttl,
            op_timeout: self.op_timeout,
            _record: PhantomData,
        }
    }
}

impl<S, T> JsonRepository<S, T>
where
    S: StateStore,
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<S>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            ttl,
            op_timeout: DEFAULT_OP_TIMEOUT,
            _record: PhantomData,
        }
    }

    pub fn with_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub fn key(&self, id: &str) -> String {
        scoped_key(&self.prefix, id)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load a record; absent or expired reads as `None`
    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        let key = self.key(id);
        let bytes = bounded(self.op_timeout, "GET", &key, self.store.get(&key)).await?;
        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Store a record, restarting its expiry
    pub async fn set(&self, id: &str, record: &T) -> Result<()> {
        let key = self.key(id);
        let bytes = serde_json::to_vec(record)?;
        bounded(
            self.op_timeout,
            "SET",
            &key,
            self.store.set(&key, &bytes, self.ttl),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let key = self.key(id);
        bounded(self.op_timeout, "DEL", &key, self.store.delete(&key)).await
    }
}

/// Plain string markers under `<prefix>:<id>`
#[derive(Debug)]
pub struct StatusRepository<S> {
    store: Arc<S>,
    prefix: String,
    ttl: Duration,
    op_timeout: Duration,
}

impl<S> Clone for StatusRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            prefix: self.prefix.clone(),
            ttl: self.ttl,
            op_timeout: self.op_timeout,
        }
    }
}

impl<S: StateStore> StatusRepository<S> {
    pub fn new(store: Arc<S>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            ttl,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub fn key(&self, id: &str) -> String {
        scoped_key(&self.prefix, id)
    }

    pub async fn get(&self, id: &str) -> Result<Option<String>> {
        let key = self.key(id);
        let bytes = bounded(self.op_timeout, "GET", &key, self.store.get(&key)).await?;
        bytes
            .map(|bytes| {
                String::from_utf8(bytes)
                    .map_err(|e| StoreError::serialization(format!("status {}: {}", key, e)))
            })
            .transpose()
    }

    pub async fn set(&self, id: &str, status: &str) -> Result<()> {
        let key = self.key(id);
        bounded(
            self.op_timeout,
            "SET",
            &key,
            self.store.set(&key, status.as_bytes(), self.ttl),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let key = self.key(id);
        bounded(self.op_timeout, "DEL", &key, self.store.delete(&key)).await
    }
}
