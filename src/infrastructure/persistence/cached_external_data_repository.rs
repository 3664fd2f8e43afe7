//! Read-through cache wrapper around a durable store.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::domain::entities::{ExternalData, NewExternalData};
use crate::domain::repositories::ExternalDataRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Serves `most_recent` from the cache when possible and writes every append
/// through to it.
///
/// The inner store is authoritative: appends hit it first, and a cache write
/// that fails drops the cached entry so the next read goes to the store.
/// Both the write-through and the read-through populate go through
/// [`CacheService::set_latest`], which never replaces a newer entry, so a
/// reader that loaded a record before a concurrent append cannot push the
/// cache back to it. Cache errors are logged and never surface to callers.
pub struct CachedExternalDataRepository {
    inner: Arc<dyn ExternalDataRepository>,
    cache: Arc<dyn CacheService>,
}

impl CachedExternalDataRepository {
    pub fn new(inner: Arc<dyn ExternalDataRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl ExternalDataRepository for CachedExternalDataRepository {
    async fn append(&self, record: NewExternalData) -> Result<ExternalData, AppError> {
        let stored = self.inner.append(record).await?;

        if let Err(e) = self.cache.set_latest(&stored).await {
            warn!("Failed to cache record {}: {}", stored.id, e);
            if let Err(e) = self.cache.invalidate(&stored.source, &stored.key_name).await {
                warn!(
                    "Failed to invalidate cached {}/{}: {}",
                    stored.source, stored.key_name, e
                );
            }
        }

        Ok(stored)
    }

    async fn most_recent(
        &self,
        source: &str,
        key_name: &str,
    ) -> Result<Option<ExternalData>, AppError> {
        match self.cache.get_latest(source, key_name).await {
            Ok(Some(record)) => return Ok(Some(record)),
            Ok(None) => {}
            Err(e) => warn!("Cache read failed, falling back to store: {}", e),
        }

        let record = self.inner.most_recent(source, key_name).await?;

        if let Some(ref found) = record
            && let Err(e) = self.cache.set_latest(found).await
        {
            warn!("Failed to populate cache for {}/{}: {}", source, key_name, e);
        }

        Ok(record)
    }

    async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }
}
