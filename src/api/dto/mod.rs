//! Data Transfer Objects for API requests and responses.
//!
//! Query DTOs use Serde for deserialization and validator for input checks.

pub mod health;
pub mod weather;
