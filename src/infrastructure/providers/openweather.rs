//! OpenWeatherMap client.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{endpoint, transport_error};
use crate::domain::entities::Source;
use crate::domain::normalizer::NormalizeError;
use crate::domain::providers::{ProviderError, RawWeather, WeatherProvider};

/// Keyed provider backed by `GET /data/2.5/weather`.
///
/// Without an API key every fetch returns [`ProviderError::NotConfigured`]
/// and no request is made.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    /// Creates a client. Blank keys are treated as absent.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    fn source(&self) -> Source {
        Source::OpenWeather
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, key: &str) -> Result<RawWeather, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::NotConfigured);
        };

        let url = endpoint(&self.base_url, "/data/2.5/weather");
        debug!("Fetching OpenWeather current weather for {:?}", key);

        let response = self
            .client
            .get(&url)
            .query(&[("q", key), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(transport_error)?;
        let payload: serde_json::Value =
            serde_json::from_str(&body).map_err(NormalizeError::from)?;

        Ok(RawWeather::OpenWeather(payload))
    }
}
