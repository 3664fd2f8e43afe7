//! Open-Meteo client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{endpoint, transport_error};
use crate::domain::entities::Source;
use crate::domain::normalizer::NormalizeError;
use crate::domain::providers::{GeocodeMatch, ProviderError, RawWeather, WeatherProvider};

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    /// Omitted entirely by the API when nothing matches.
    #[serde(default)]
    results: Vec<GeocodeMatch>,
}

/// Keyless provider: geocode the key, then read current conditions at the
/// first match's coordinates.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn new(
        client: reqwest::Client,
        geocoding_url: impl Into<String>,
        forecast_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
        }
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(transport_error)?;
        Ok(serde_json::from_str(&body).map_err(NormalizeError::from)?)
    }

    async fn geocode(&self, key: &str) -> Result<GeocodeMatch, ProviderError> {
        let url = endpoint(&self.geocoding_url, "/v1/search");
        let body = self
            .get_json(
                &url,
                &[
                    ("name", key.to_string()),
                    ("count", "1".to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        let response = GeocodeResponse::deserialize(&body).map_err(NormalizeError::from)?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NoGeocodeMatch(key.to_string()))
    }

    async fn current_weather(&self, place: &GeocodeMatch) -> Result<serde_json::Value, ProviderError> {
        let url = endpoint(&self.forecast_url, "/v1/forecast");
        self.get_json(
            &url,
            &[
                ("latitude", place.latitude.to_string()),
                ("longitude", place.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    fn source(&self) -> Source {
        Source::OpenMeteo
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch(&self, key: &str) -> Result<RawWeather, ProviderError> {
        let place = self.geocode(key).await?;
        debug!(
            "Geocoded {:?} to {} ({}, {})",
            key, place.name, place.latitude, place.longitude
        );

        let forecast = self.current_weather(&place).await?;

        Ok(RawWeather::OpenMeteo { place, forecast })
    }
}
