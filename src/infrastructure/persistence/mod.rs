//! Fetch-log repository implementations.
//!
//! - [`PgExternalDataRepository`] - PostgreSQL storage via SQLx
//! - [`InMemoryExternalDataRepository`] - process-local storage when no database is configured
//! - [`CachedExternalDataRepository`] - Redis read-through wrapper around either of the above

pub mod cached_external_data_repository;
pub mod memory_external_data_repository;
pub mod pg_external_data_repository;

pub use cached_external_data_repository::CachedExternalDataRepository;
pub use memory_external_data_repository::InMemoryExternalDataRepository;
pub use pg_external_data_repository::PgExternalDataRepository;
