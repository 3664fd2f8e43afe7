//! Canonical, provider-independent weather record.

use serde::{Deserialize, Serialize};

use super::source::Source;

/// Normalized weather for one place.
///
/// This is the document stored in [`super::ExternalData::payload`] and the
/// body returned by `GET /external/weather`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    /// Place name as resolved by the provider, not necessarily the lookup key.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_celsius: Option<f64>,
    pub description: String,
    pub icon: String,
    pub source_id: Source,
}

impl WeatherReport {
    /// Serializes the report into the persisted payload string.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a persisted payload string.
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
