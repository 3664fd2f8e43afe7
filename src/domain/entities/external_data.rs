//! Persisted fetch record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::source::Source;
use super::weather_report::WeatherReport;

/// One immutable entry of the fetch log.
///
/// `(source, key_name)` is not unique; the current entry for a pair is the one
/// with the latest `fetched_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalData {
    pub id: i64,
    pub source: String,
    pub key_name: String,
    /// JSON-encoded [`WeatherReport`].
    pub payload: String,
    pub fetched_at: DateTime<Utc>,
}

impl ExternalData {
    pub fn new(
        id: i64,
        source: String,
        key_name: String,
        payload: String,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            source,
            key_name,
            payload,
            fetched_at,
        }
    }

    /// Decodes the stored payload.
    pub fn report(&self) -> Result<WeatherReport, serde_json::Error> {
        WeatherReport::from_payload(&self.payload)
    }

    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// Returns true while the record is no older than `window` at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age_at(now) <= window
    }

    /// Ordering used to pick the newest record of a pair: `fetched_at`, then `id`.
    pub fn recency(&self) -> (DateTime<Utc>, i64) {
        (self.fetched_at, self.id)
    }

    /// Returns true when `self` is strictly newer than `other`.
    pub fn supersedes(&self, other: &ExternalData) -> bool {
        self.recency() > other.recency()
    }
}

/// Input for appending a record.
///
/// `fetched_at` is normally left `None` so the store stamps it; backfills and
/// tests may supply an explicit time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExternalData {
    pub source: String,
    pub key_name: String,
    pub payload: String,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl NewExternalData {
    /// Builds a record from a normalized report. The payload is always the
    /// serialized canonical shape.
    pub fn from_report(
        source: Source,
        key_name: &str,
        report: &WeatherReport,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            source: source.as_str().to_string(),
            key_name: key_name.to_string(),
            payload: report.to_payload()?,
            fetched_at: None,
        })
    }

    pub fn fetched_at(mut self, at: DateTime<Utc>) -> Self {
        self.fetched_at = Some(at);
        self
    }
}
