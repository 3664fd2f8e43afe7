//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Latest-record caching (Redis and no-op implementations)
//! - [`persistence`] - Fetch-log stores (PostgreSQL, in-memory, cached wrapper)
//! - [`providers`] - Upstream weather API clients

pub mod cache;
pub mod persistence;
pub mod providers;
