//! Identifiers for the producers of weather records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which upstream (or the synthetic fallback) produced a record.
///
/// The string form is what gets persisted in `external_data.source` and what
/// callers pass to `GET /external/latest?source=...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// OpenWeatherMap, requires an API key.
    #[serde(rename = "openweather")]
    OpenWeather,
    /// Open-Meteo geocoding + forecast, no key required.
    #[serde(rename = "open-meteo")]
    OpenMeteo,
    /// Synthetic record written when every provider failed.
    #[serde(rename = "mock-openweather")]
    Placeholder,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::OpenWeather, Source::OpenMeteo, Source::Placeholder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::OpenWeather => "openweather",
            Source::OpenMeteo => "open-meteo",
            Source::Placeholder => "mock-openweather",
        }
    }

    /// Parses a persisted identifier. Returns `None` for anything unknown.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
