/// Cache layer
///
/// A single named Redis entry holds the rendered index page payload. It is
/// populated lazily on the first read after invalidation and cleared
/// explicitly from every Post-mutating code path; the short TTL is only a
/// defensive backstop, correctness depends on the write-triggered clearing.
use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

const INDEX_KEY: &str = "index:v1";

#[derive(Clone)]
pub struct IndexCache {
    redis: ConnectionManager,
    ttl: Duration,
}

impl IndexCache {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self {
            redis,
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    fn index_key() -> &'static str {
        INDEX_KEY
    }

    /// Fetch the cached index payload. Redis faults degrade to a miss so the
    /// page can still be built from the database.
    pub async fn get(&self) -> Option<Vec<u8>> {
        let mut conn = self.redis.clone();
        match conn.get::<_, Option<Vec<u8>>>(Self::index_key()).await {
            Ok(Some(payload)) => {
                debug!("Index cache HIT ({} bytes)", payload.len());
                Some(payload)
            }
            Ok(None) => {
                debug!("Index cache MISS");
                None
            }
            Err(e) => {
                warn!("Redis read error for index cache: {}", e);
                None
            }
        }
    }

    /// Store the rendered index payload. Write faults are logged and
    /// swallowed; the next read will rebuild from the database.
    pub async fn put(&self, payload: &[u8]) {
        let mut conn = self.redis.clone();
        match conn
            .set_ex::<_, _, ()>(Self::index_key(), payload, self.ttl.as_secs())
            .await
        {
            Ok(()) => debug!(
                "Index cache WRITE ({} bytes, TTL {:?})",
                payload.len(),
                self.ttl
            ),
            Err(e) => warn!("Failed to write index cache: {}", e),
        }
    }

    /// Clear the entry. Called from every Post create/update/delete path
    /// before the response is sent; failures propagate because a write that
    /// cannot invalidate the cache must not silently succeed.
    pub async fn invalidate(&self) -> Result<()> {
        let mut conn = self.redis.clone();
        conn.del::<_, ()>(Self::index_key())
            .await
            .map_err(|e| AppError::CacheError(e.to_string()))?;

        debug!("Index cache INVALIDATE");
        Ok(())
    }
}
