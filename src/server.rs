//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, cache setup, upstream clients, and Axum server lifecycle.

use crate::application::services::WeatherService;
use crate::config::Config;
use crate::domain::repositories::ExternalDataRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{
    CachedExternalDataRepository, InMemoryExternalDataRepository, PgExternalDataRepository,
};
use crate::infrastructure::providers::{OpenMeteoClient, OpenWeatherClient, build_http_client};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations (or the in-memory store)
/// - Redis cache (or NullCache fallback)
/// - Upstream HTTP clients
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The HTTP client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;
    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wires the store, cache, upstream clients, and fetch service together.
///
/// Shared by the HTTP server and the admin CLI.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let cache = connect_cache(config).await;
    let repository = build_repository(config, cache.clone()).await?;

    let http = build_http_client(config.upstream_timeout())
        .context("Failed to build upstream HTTP client")?;
    let keyed = Arc::new(OpenWeatherClient::new(
        http.clone(),
        config.openweather_base_url.clone(),
        config.openweather_api_key.clone(),
    ));
    let keyless = Arc::new(OpenMeteoClient::new(
        http,
        config.geocoding_base_url.clone(),
        config.forecast_base_url.clone(),
    ));

    let weather_service = Arc::new(WeatherService::new(
        repository,
        keyed,
        keyless,
        config.freshness_window(),
    ));

    Ok(AppState::new(weather_service, cache))
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.freshness_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    }
}

/// Selects PostgreSQL when configured, the in-memory store otherwise, and
/// wraps it with the cache when Redis is enabled.
async fn build_repository(
    config: &Config,
    cache: Arc<dyn CacheService>,
) -> Result<Arc<dyn ExternalDataRepository>> {
    let store: Arc<dyn ExternalDataRepository> = match &config.database_url {
        Some(url) => {
            let pool = connect_pool(config, url).await?;
            Arc::new(PgExternalDataRepository::new(Arc::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, storing fetch records in memory");
            Arc::new(InMemoryExternalDataRepository::new())
        }
    };

    if config.is_cache_enabled() {
        Ok(Arc::new(CachedExternalDataRepository::new(store, cache)))
    } else {
        Ok(store)
    }
}

async fn connect_pool(config: &Config, url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");

    Ok(pool)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
