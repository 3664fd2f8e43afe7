//! No-op cache implementation for testing or disabled caching.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::ExternalData;
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when Redis is not configured or the connection failed at startup.
/// Every read is a miss; every write succeeds without storing anything.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_latest(
        &self,
        _source: &str,
        _key_name: &str,
    ) -> CacheResult<Option<ExternalData>> {
        Ok(None)
    }

    async fn set_latest(&self, _record: &ExternalData) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _source: &str, _key_name: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
