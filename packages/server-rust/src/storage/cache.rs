//! Redis-backed cache adapter.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use roster_core::DomainError;

use crate::traits::Cache;

/// Redis implementation of the [`Cache`] port.
///
/// `ConnectionManager` multiplexes and reconnects internally, so clones
/// are cheap and each call works on its own handle.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects to the cache server.
    ///
    /// # Errors
    ///
    /// Propagates the connect failure; callers treat it as startup-fatal.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        info!("connected to cache at {url}");
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(|_| DomainError::Internal)
    }

    async fn set(
        &self,
        key: &str,
        value: &[u8],
        ttl: Option<Duration>,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, value, ttl.as_secs())
                .await
                .map_err(|_| DomainError::Internal),
            None => conn
                .set::<_, _, ()>(key, value)
                .await
                .map_err(|_| DomainError::Internal),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|_| DomainError::Internal)
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn
            .keys(format!("{prefix}*"))
            .await
            .map_err(|_| DomainError::Internal)?;

        if !keys.is_empty() {
            debug!(count = keys.len(), prefix, "invalidating cached keys");
            conn.del::<_, ()>(keys)
                .await
                .map_err(|_| DomainError::Internal)?;
        }
        Ok(())
    }
}
