//! Provider payload normalization.
//!
//! Pure functions that map each upstream's document into a
//! [`WeatherReport`]. Condition codes never cause an error; only a document
//! that lacks the provider's basic shape does.

pub mod codes;

use serde::Deserialize;

use crate::domain::entities::{Source, WeatherReport};
use crate::domain::providers::GeocodeMatch;

/// Temperature written into placeholder records.
pub const PLACEHOLDER_TEMPERATURE_CELSIUS: f64 = 20.0;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("unexpected document shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("missing field '{0}'")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct OpenWeatherPayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    main: Option<OpenWeatherMain>,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    #[serde(default)]
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCondition {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoForecast {
    #[serde(default)]
    current_weather: Option<OpenMeteoCurrent>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    weathercode: Option<i64>,
}

/// Normalizes an OpenWeatherMap `/data/2.5/weather` body requested with
/// `units=metric`.
///
/// # Errors
///
/// Returns [`NormalizeError`] if the body is not an object or has no `name`.
pub fn normalize_openweather(raw: &serde_json::Value) -> Result<WeatherReport, NormalizeError> {
    let payload = OpenWeatherPayload::deserialize(raw)?;

    let name = payload
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or(NormalizeError::MissingField("name"))?;

    let condition = payload.weather.into_iter().next();
    let (description, icon_code) = match condition {
        Some(c) => (c.description, c.icon),
        None => (None, None),
    };

    Ok(WeatherReport {
        name,
        temperature_celsius: payload.main.and_then(|m| m.temp),
        description: description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| codes::UNKNOWN.description.to_string()),
        icon: icon_code
            .as_deref()
            .map(codes::openweather_icon_glyph)
            .unwrap_or(codes::UNKNOWN.glyph)
            .to_string(),
        source_id: Source::OpenWeather,
    })
}

/// Normalizes an Open-Meteo forecast for the first geocoding match.
///
/// The caller is responsible for rejecting an empty match list; this function
/// only ever sees a resolved place.
///
/// # Errors
///
/// Returns [`NormalizeError`] if the forecast has no `current_weather` block.
pub fn normalize_open_meteo(
    place: &GeocodeMatch,
    forecast: &serde_json::Value,
    requested_key: &str,
) -> Result<WeatherReport, NormalizeError> {
    let forecast = OpenMeteoForecast::deserialize(forecast)?;
    let current = forecast
        .current_weather
        .ok_or(NormalizeError::MissingField("current_weather"))?;

    let condition = current
        .weathercode
        .map(codes::wmo_condition)
        .unwrap_or(codes::UNKNOWN);

    let name = if place.name.trim().is_empty() {
        requested_key.to_string()
    } else {
        place.name.clone()
    };

    Ok(WeatherReport {
        name,
        temperature_celsius: current.temperature,
        description: condition.description.to_string(),
        icon: condition.glyph.to_string(),
        source_id: Source::OpenMeteo,
    })
}

/// The synthetic record used when every provider failed.
pub fn placeholder(requested_key: &str) -> WeatherReport {
    WeatherReport {
        name: requested_key.to_string(),
        temperature_celsius: Some(PLACEHOLDER_TEMPERATURE_CELSIUS),
        description: codes::CLEAR_SKY.description.to_string(),
        icon: codes::CLEAR_SKY.glyph.to_string(),
        source_id: Source::Placeholder,
    }
}
