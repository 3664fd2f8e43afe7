//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /health`                 - Health check: store, cache, provider chain
//! - `GET /external/weather`       - Current weather (rate limited)
//! - `GET /external/latest`        - Newest stored record (rate limited)
//! - `/api/external/*`             - Same routes under the legacy prefix
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/external/*`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let external = api::routes::external_routes();
    let external = if behind_proxy {
        external.layer(rate_limit::proxied_layer())
    } else {
        external.layer(rate_limit::layer())
    };

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/external", external.clone())
        .nest("/api/external", external)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
