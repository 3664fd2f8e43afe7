//! Repository trait definitions for the domain layer.
//!
//! Implementations live in `crate::infrastructure::persistence`; mock
//! implementations are generated via `mockall` for unit tests.

pub mod external_data_repository;

pub use external_data_repository::ExternalDataRepository;

#[cfg(test)]
pub use external_data_repository::MockExternalDataRepository;
