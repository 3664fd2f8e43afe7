//! External data route configuration.

use crate::api::handlers::{latest_handler, weather_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// External data routes, mounted under `/external` (and `/api/external`).
///
/// # Endpoints
///
/// - `GET /weather?city=<name>`         - Current weather with caching and fallback
/// - `GET /latest?source=<id>&key=<k>`  - Newest stored record for a pair
pub fn external_routes() -> Router<AppState> {
    Router::new()
        .route("/weather", get(weather_handler))
        .route("/latest", get(latest_handler))
}
