//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::entities::ExternalData;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Hot copy of the newest record per `(source, key_name)`.
///
/// The durable store stays authoritative. Callers treat every error as a miss
/// and never fail a request because the cache is down.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached newest record for the pair, if any.
    async fn get_latest(&self, source: &str, key_name: &str)
    -> CacheResult<Option<ExternalData>>;

    /// Stores `record` as the newest record for its pair unless the cached
    /// entry is at least as new (see [`ExternalData::supersedes`]).
    ///
    /// The compare and the write are atomic: an older record never replaces a
    /// newer one, whatever order concurrent writers arrive in.
    async fn set_latest(&self, record: &ExternalData) -> CacheResult<()>;

    /// Drops the cached entry for the pair.
    async fn invalidate(&self, source: &str, key_name: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
