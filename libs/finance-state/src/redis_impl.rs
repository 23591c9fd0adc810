//! Redis state store

use std::future::Future;
use std::time::Duration;

use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::store::StateStore;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis-backed TTL store
///
/// Values are written with `SET .. EX`, so expiry is handled by Redis itself.
#[derive(Clone)]
pub struct RedisStateStore {
    conn: ConnectionManager,
    url: String,
}

impl std::fmt::Debug for RedisStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStateStore")
            .field("url", &self.url)
            .field("conn", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStateStore {
    /// Connect with a bounded wait
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)?;

        let conn = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::connection("Redis connection timeout after 5 seconds"))??;

        info!("Connected to Redis at {}", url);
        Ok(Self {
            conn,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// PING operation
    pub async fn ping(&self) -> Result<String> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong)
    }
}

/// Redis rejects `EX 0`; sub-second lifetimes round up to one second
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

impl StateStore for RedisStateStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        async move {
            let value: Option<Vec<u8>> = conn.get(&key).await?;
            Ok(value)
        }
    }

    fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        let value = value.to_vec();
        async move {
            let _: () = conn.set_ex(&key, value, expiry_seconds(ttl)).await?;
            debug!("SET {} EX {}", key, expiry_seconds(ttl));
            Ok(())
        }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        async move {
            let _: u32 = conn.del(&key).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_seconds_rounds_up_to_one() {
        assert_eq!(expiry_seconds(Duration::from_millis(10)), 1);
        assert_eq!(expiry_seconds(Duration::from_secs(3600)), 3600);
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let result = RedisStateStore::connect("not-a-redis-url").await;
        assert!(result.is_err());
    }
}
