//! Application layer services implementing business logic.
//!
//! Services consume domain traits and provide a clean API for HTTP handlers
//! and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::weather_service::WeatherService`] - Cached weather lookup with provider fallback
pub mod services;
