//! HTTP request handlers for API endpoints.

pub mod health;
pub mod weather;

pub use health::health_handler;
pub use weather::{latest_handler, weather_handler};
