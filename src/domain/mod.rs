//! Domain layer containing entities, contracts, and pure logic.
//!
//! - [`entities`] - Fetch records and the canonical weather document
//! - [`repositories`] - Append-only store contract
//! - [`providers`] - Upstream provider contract and raw payload types
//! - [`normalizer`] - Payload normalization and condition code tables
//!
//! The domain layer does no I/O; the orchestration lives in
//! [`crate::application::services`] and the concrete clients and stores in
//! [`crate::infrastructure`].

pub mod entities;
pub mod normalizer;
pub mod providers;
pub mod repositories;
