//! Redis-backed latest-record cache.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::ExternalData;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, Script, aio::ConnectionManager};
use tracing::{debug, info};

/// Replaces the entry only when the incoming order token sorts after the
/// stored one. Tokens are fixed-width digit strings, so string comparison
/// matches `(fetched_at, id)` ordering.
///
/// KEYS[1] = entry key, ARGV = order token, record JSON, TTL seconds.
const SET_IF_NEWER: &str = r#"
local current = redis.call('HGET', KEYS[1], 'order')
if current and current >= ARGV[1] then
    return 0
end
redis.call('HSET', KEYS[1], 'order', ARGV[1], 'record', ARGV[2])
redis.call('EXPIRE', KEYS[1], ARGV[3])
return 1
"#;

/// Redis cache holding the newest record per `(source, key_name)`.
///
/// Each entry is a hash with `order` (see [`order_token`]) and `record`
/// fields. Uses `ConnectionManager` for connection reuse. Entries expire
/// after the freshness window; an expired entry only costs a store read.
pub struct RedisCache {
    client: ConnectionManager,
    ttl_seconds: u64,
    key_prefix: String,
    set_if_newer: Script,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `ttl_seconds` - lifetime of cached entries, normally the freshness window
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            ttl_seconds: ttl_seconds.max(1),
            key_prefix: "weather:latest:".to_string(),
            set_if_newer: Script::new(SET_IF_NEWER),
        })
    }

    fn build_key(&self, source: &str, key_name: &str) -> String {
        build_key(&self.key_prefix, source, key_name)
    }
}

/// Source identifiers never contain `:`, so the first separator after the
/// prefix is unambiguous even when the key itself contains colons.
fn build_key(prefix: &str, source: &str, key_name: &str) -> String {
    format!("{}{}:{}", prefix, source, key_name)
}

/// Fixed-width encoding of [`ExternalData::recency`]. Timestamps before the
/// epoch clamp to zero.
fn order_token(record: &ExternalData) -> String {
    let (fetched_at, id) = record.recency();
    format!(
        "{:020}:{:020}",
        fetched_at.timestamp_micros().max(0),
        id.max(0)
    )
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_latest(
        &self,
        source: &str,
        key_name: &str,
    ) -> CacheResult<Option<ExternalData>> {
        let key = self.build_key(source, key_name);
        let mut conn = self.client.clone();

        let cached: Option<String> = conn
            .hget(&key, "record")
            .await
            .map_err(|e| CacheError::OperationError(format!("HGET {}: {}", key, e)))?;

        match cached {
            Some(json) => {
                debug!("Cache HIT: {}", key);
                serde_json::from_str(&json)
                    .map(Some)
                    .map_err(|e| CacheError::OperationError(format!("decode {}: {}", key, e)))
            }
            None => {
                debug!("Cache MISS: {}", key);
                Ok(None)
            }
        }
    }

    async fn set_latest(&self, record: &ExternalData) -> CacheResult<()> {
        let key = self.build_key(&record.source, &record.key_name);
        let json = serde_json::to_string(record)
            .map_err(|e| CacheError::OperationError(format!("encode {}: {}", key, e)))?;
        let mut conn = self.client.clone();

        let replaced: i32 = self
            .set_if_newer
            .key(&key)
            .arg(order_token(record))
            .arg(json)
            .arg(self.ttl_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| CacheError::OperationError(format!("SET {}: {}", key, e)))?;

        if replaced == 1 {
            debug!("Cache SET: {} (TTL: {}s)", key, self.ttl_seconds);
        } else {
            debug!("Cache SET skipped: {} already holds a newer record", key);
        }
        Ok(())
    }

    async fn invalidate(&self, source: &str, key_name: &str) -> CacheResult<()> {
        let key = self.build_key(source, key_name);
        let mut conn = self.client.clone();

        let deleted: i32 = conn
            .del(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("DEL {}: {}", key, e)))?;
        if deleted > 0 {
            debug!("Cache INVALIDATE: {}", key);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
