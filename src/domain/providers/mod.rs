//! Upstream weather provider capability.
//!
//! A provider turns a lookup key into a raw upstream document. Concrete
//! clients live in `crate::infrastructure::providers`; each one is an isolated
//! failure domain and reports failures through [`ProviderError`] instead of
//! returning partial data.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::entities::{Source, WeatherReport};
use crate::domain::normalizer::{self, NormalizeError};

/// Why a provider did not produce a document.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No credential is configured; no request was made.
    #[error("provider is not configured")]
    NotConfigured,
    /// Upstream signalled quota exhaustion (HTTP 429).
    #[error("upstream rate limit exceeded")]
    RateLimited,
    /// Connection, timeout, or body read failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Upstream answered with a non-2xx status other than a keyed rate limit.
    #[error("upstream returned status {0}")]
    Status(u16),
    /// Geocoding returned no match for the key.
    #[error("no geocoding match for '{0}'")]
    NoGeocodeMatch(String),
    /// The document could not be decoded or normalized.
    #[error("malformed upstream payload: {0}")]
    Malformed(#[from] NormalizeError),
}

impl ProviderError {
    /// Returns true for failures that fall through to the next provider.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport(_)
                | ProviderError::Status(_)
                | ProviderError::NoGeocodeMatch(_)
                | ProviderError::Malformed(_)
        )
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured => "not_configured",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::Transport(_) => "transport",
            ProviderError::Status(_) => "status",
            ProviderError::NoGeocodeMatch(_) => "no_match",
            ProviderError::Malformed(_) => "malformed",
        }
    }
}

/// First match of a geocoding lookup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeMatch {
    #[serde(default)]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
}

/// Raw upstream output, tagged by the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawWeather {
    /// OpenWeatherMap `/data/2.5/weather` body.
    OpenWeather(serde_json::Value),
    /// Open-Meteo geocoding match plus `/v1/forecast` body.
    OpenMeteo {
        place: GeocodeMatch,
        forecast: serde_json::Value,
    },
}

impl RawWeather {
    /// Normalizes into the canonical record.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] when the document does not have the
    /// provider's documented shape.
    pub fn normalize(&self, requested_key: &str) -> Result<WeatherReport, NormalizeError> {
        match self {
            RawWeather::OpenWeather(payload) => normalizer::normalize_openweather(payload),
            RawWeather::OpenMeteo { place, forecast } => {
                normalizer::normalize_open_meteo(place, forecast, requested_key)
            }
        }
    }
}

/// A single upstream integration.
///
/// # Implementations
///
/// - [`crate::infrastructure::providers::OpenWeatherClient`] - keyed
/// - [`crate::infrastructure::providers::OpenMeteoClient`] - keyless
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Identifier written to records this provider produces.
    fn source(&self) -> Source;

    /// Whether the provider has what it needs to make a request.
    fn is_configured(&self) -> bool;

    /// Fetches the raw document for `key`.
    ///
    /// # Errors
    ///
    /// See [`ProviderError`]. Implementations never return a partial document.
    async fn fetch(&self, key: &str) -> Result<RawWeather, ProviderError>;
}
