//! Repository trait for the append-only fetch log.

use crate::domain::entities::{ExternalData, NewExternalData};
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only store of fetch records.
///
/// No update or delete is exposed. Reads must observe every append that
/// returned `Ok` earlier in the same process.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgExternalDataRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::InMemoryExternalDataRepository`] - process-local
/// - [`crate::infrastructure::persistence::CachedExternalDataRepository`] - Redis read-through wrapper
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExternalDataRepository: Send + Sync {
    /// Persists a new record, assigning `id` and, when absent, `fetched_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] when the record could not be stored.
    async fn append(&self, record: NewExternalData) -> Result<ExternalData, AppError>;

    /// Returns the newest record whose `source` and `key_name` both match
    /// exactly (case-sensitive), regardless of age.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn most_recent(
        &self,
        source: &str,
        key_name: &str,
    ) -> Result<Option<ExternalData>, AppError>;

    /// Reports whether the backing store is reachable.
    async fn health_check(&self) -> bool;
}
