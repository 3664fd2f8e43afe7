//! Handlers for the external weather endpoints.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};
use validator::Validate;

use crate::api::dto::weather::{LatestQuery, WeatherQuery};
use crate::domain::entities::ExternalData;
use crate::error::AppError;
use crate::state::AppState;

pub const CACHE_HEADER: &str = "x-weather-cache";
pub const SOURCE_HEADER: &str = "x-weather-source";

/// Returns current weather for a city.
///
/// # Endpoint
///
/// `GET /external/weather?city=<name>`
///
/// # Response Codes
///
/// - **200 OK**: canonical record (fresh cache, provider, or placeholder)
/// - **400 Bad Request**: `city` missing or blank
/// - **429 Too Many Requests**: OpenWeather reported a rate limit
/// - **503 Service Unavailable**: the fetched record could not be persisted
///
/// # Response
///
/// ```json
/// {
///   "name": "Orlando",
///   "temperatureCelsius": 31.2,
///   "description": "clear sky",
///   "icon": "☀️",
///   "sourceId": "openweather"
/// }
/// ```
///
/// `x-weather-cache` is `hit` or `miss`; `x-weather-source` names the
/// producer of the record.
pub async fn weather_handler(
    State(state): State<AppState>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|e| AppError::bad_request(e.body_text()))?;
    query.validate()?;

    let lookup = state.weather_service.fetch_weather(&query.city).await?;

    let cache = if lookup.origin.is_cache_hit() {
        "hit"
    } else {
        "miss"
    };

    Ok((
        [
            (CACHE_HEADER, cache),
            (SOURCE_HEADER, lookup.report.source_id.as_str()),
        ],
        Json(lookup.report),
    ))
}

/// Returns the newest stored record for an exact `(source, key)` pair,
/// regardless of freshness.
///
/// # Endpoint
///
/// `GET /external/latest?source=<id>&key=<k>`
///
/// # Response Codes
///
/// - **200 OK**: `{"id", "source", "keyName", "payload", "fetchedAt"}`
/// - **400 Bad Request**: a parameter is missing or blank
/// - **404 Not Found**: nothing stored for the pair
pub async fn latest_handler(
    State(state): State<AppState>,
    query: Result<Query<LatestQuery>, QueryRejection>,
) -> Result<Json<ExternalData>, AppError> {
    let Query(query) = query.map_err(|e| AppError::bad_request(e.body_text()))?;
    query.validate()?;

    let record = state
        .weather_service
        .latest(&query.source, &query.key)
        .await?;

    Ok(Json(record))
}
