//! Upstream weather API clients.
//!
//! - [`OpenWeatherClient`] - OpenWeatherMap current weather (API key required)
//! - [`OpenMeteoClient`] - Open-Meteo geocoding + forecast (no key)
//!
//! Both share one `reqwest::Client` built by [`build_http_client`], so every
//! outbound request is bounded by the configured timeout.

mod open_meteo;
mod openweather;

pub use open_meteo::OpenMeteoClient;
pub use openweather::OpenWeatherClient;

use std::time::Duration;

use crate::domain::providers::ProviderError;

pub const DEFAULT_OPENWEATHER_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client used for all upstream calls.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(4)
        .build()
}

/// Joins a base URL and an absolute path without doubling the slash.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Maps a reqwest failure, stripping the URL so credentials in the query
/// string never reach the logs.
fn transport_error(e: reqwest::Error) -> ProviderError {
    ProviderError::Transport(e.without_url().to_string())
}
