//! Weather lookup orchestration: cache freshness, provider fallback, and
//! persistence of every fetch.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::entities::{ExternalData, NewExternalData, Source, WeatherReport};
use crate::domain::normalizer;
use crate::domain::providers::{ProviderError, WeatherProvider};
use crate::domain::repositories::ExternalDataRepository;
use crate::error::AppError;

/// How a lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOrigin {
    /// A fresh record was found; nothing was fetched or written.
    Cache,
    /// A provider answered and its record was appended.
    Provider(Source),
    /// Every provider failed and a placeholder record was appended.
    Placeholder,
}

impl LookupOrigin {
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, LookupOrigin::Cache)
    }
}

/// Result of [`WeatherService::fetch_weather`].
#[derive(Debug, Clone)]
pub struct WeatherLookup {
    pub report: WeatherReport,
    pub record: ExternalData,
    pub origin: LookupOrigin,
}

/// Orchestrates weather lookups.
///
/// Per call, exactly one of these happens: a fresh cached record is returned,
/// the keyed provider's record is appended and returned, the keyless
/// provider's record is appended and returned, a placeholder is appended and
/// returned, or the keyed provider's rate limit is propagated. At most one
/// record is appended.
///
/// Concurrent calls for the same key are not de-duplicated; both may fetch
/// and both may append.
pub struct WeatherService {
    repository: Arc<dyn ExternalDataRepository>,
    keyed: Arc<dyn WeatherProvider>,
    keyless: Arc<dyn WeatherProvider>,
    freshness_window: Duration,
}

impl WeatherService {
    /// Creates the service.
    ///
    /// `keyed` is consulted first when it reports itself configured; `keyless`
    /// is always the last provider before the placeholder.
    pub fn new(
        repository: Arc<dyn ExternalDataRepository>,
        keyed: Arc<dyn WeatherProvider>,
        keyless: Arc<dyn WeatherProvider>,
        freshness_window: Duration,
    ) -> Self {
        Self {
            repository,
            keyed,
            keyless,
            freshness_window,
        }
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Whether the keyed provider has a credential.
    pub fn keyed_configured(&self) -> bool {
        self.keyed.is_configured()
    }

    /// The cache lane consulted for lookups: the keyed provider's when it is
    /// configured, otherwise the keyless provider's.
    pub fn intended_source(&self) -> Source {
        if self.keyed.is_configured() {
            self.keyed.source()
        } else {
            self.keyless.source()
        }
    }

    /// Returns current weather for `key`.
    ///
    /// # Errors
    ///
    /// - [`AppError::RateLimited`] when the keyed provider reports a rate
    ///   limit; nothing is persisted and the keyless provider is not tried.
    /// - [`AppError::Unavailable`] when the resulting record could not be
    ///   persisted.
    ///
    /// Every other failure is absorbed by falling back.
    pub async fn fetch_weather(&self, key: &str) -> Result<WeatherLookup, AppError> {
        let intended = self.intended_source();

        if let Some(hit) = self.fresh_record(intended, key).await {
            return Ok(hit);
        }

        for provider in self.provider_chain() {
            let source = provider.source();
            let outcome = match provider.fetch(key).await {
                Ok(raw) => raw.normalize(key).map_err(ProviderError::from),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(report) => {
                    metrics::counter!("weather_provider_requests_total", "source" => source.as_str(), "outcome" => "success").increment(1);
                    info!("Fetched weather for {:?} from {}", key, source);
                    return self
                        .persist(source, key, report, LookupOrigin::Provider(source))
                        .await;
                }
                Err(ProviderError::RateLimited) => {
                    metrics::counter!("weather_provider_requests_total", "source" => source.as_str(), "outcome" => "rate_limited").increment(1);
                    warn!("{} rate limit hit while fetching {:?}", source, key);
                    return Err(AppError::rate_limited(format!(
                        "{} rate limit exceeded",
                        source
                    )));
                }
                Err(e) if !e.is_transient() => {
                    debug!("{} skipped for {:?}: {}", source, key, e);
                }
                Err(e) => {
                    metrics::counter!("weather_provider_requests_total", "source" => source.as_str(), "outcome" => e.kind()).increment(1);
                    warn!("{} failed for {:?}: {}", source, key, e);
                }
            }
        }

        metrics::counter!("weather_placeholder_total").increment(1);
        warn!("All providers failed for {:?}, storing placeholder", key);
        self.persist(
            Source::Placeholder,
            key,
            normalizer::placeholder(key),
            LookupOrigin::Placeholder,
        )
        .await
    }

    /// Returns the newest record for the exact `(source, key)` pair,
    /// regardless of age.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when no record exists, or the store's
    /// error when the read fails.
    pub async fn latest(&self, source: &str, key: &str) -> Result<ExternalData, AppError> {
        self.repository
            .most_recent(source, key)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("No data for source '{}' and key '{}'", source, key))
            })
    }

    /// Whether the backing store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.repository.health_check().await
    }

    /// Providers to try, in order. The keyed provider is left out entirely
    /// when it has no credential.
    fn provider_chain(&self) -> Vec<&Arc<dyn WeatherProvider>> {
        if self.keyed.is_configured() {
            vec![&self.keyed, &self.keyless]
        } else {
            vec![&self.keyless]
        }
    }

    /// Looks up a fresh record in the intended lane. Store errors and
    /// undecodable payloads count as misses.
    async fn fresh_record(&self, source: Source, key: &str) -> Option<WeatherLookup> {
        let record = match self.repository.most_recent(source.as_str(), key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                metrics::counter!("weather_cache_lookups_total", "outcome" => "miss").increment(1);
                return None;
            }
            Err(e) => {
                metrics::counter!("weather_cache_lookups_total", "outcome" => "error").increment(1);
                warn!("Cache lookup failed for {}/{:?}, treating as miss: {}", source, key, e);
                return None;
            }
        };

        if !record.is_fresh(Utc::now(), self.freshness_window) {
            metrics::counter!("weather_cache_lookups_total", "outcome" => "miss").increment(1);
            debug!("Cached {}/{:?} is stale (fetched {})", source, key, record.fetched_at);
            return None;
        }

        match record.report() {
            Ok(report) => {
                metrics::counter!("weather_cache_lookups_total", "outcome" => "hit").increment(1);
                debug!("Cache HIT for {}/{:?}", source, key);
                Some(WeatherLookup {
                    report,
                    record,
                    origin: LookupOrigin::Cache,
                })
            }
            Err(e) => {
                metrics::counter!("weather_cache_lookups_total", "outcome" => "error").increment(1);
                warn!("Cached record {} has an unreadable payload: {}", record.id, e);
                None
            }
        }
    }

    async fn persist(
        &self,
        source: Source,
        key: &str,
        report: WeatherReport,
        origin: LookupOrigin,
    ) -> Result<WeatherLookup, AppError> {
        let new_record = NewExternalData::from_report(source, key, &report).map_err(|e| {
            error!("Failed to encode weather report for {:?}: {}", key, e);
            AppError::internal("Failed to encode weather record")
        })?;

        let record = self.repository.append(new_record).await.map_err(|e| {
            error!("Failed to persist {} record for {:?}: {}", source, key, e);
            AppError::unavailable("Failed to persist weather record")
        })?;

        Ok(WeatherLookup {
            report,
            record,
            origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::providers::{GeocodeMatch, MockWeatherProvider, RawWeather};
    use crate::domain::repositories::MockExternalDataRepository;
    use crate::infrastructure::persistence::InMemoryExternalDataRepository;
    use serde_json::json;

    fn keyed_provider(configured: bool) -> MockWeatherProvider {
        let mut provider = MockWeatherProvider::new();
        provider.expect_source().return_const(Source::OpenWeather);
        provider.expect_is_configured().return_const(configured);
        provider
    }

    fn keyless_provider() -> MockWeatherProvider {
        let mut provider = MockWeatherProvider::new();
        provider.expect_source().return_const(Source::OpenMeteo);
        provider.expect_is_configured().return_const(true);
        provider
    }

    fn openweather_raw() -> RawWeather {
        RawWeather::OpenWeather(json!({
            "name": "Orlando",
            "main": { "temp": 31.0 },
            "weather": [{ "description": "clear sky", "icon": "01d" }]
        }))
    }

    fn open_meteo_raw() -> RawWeather {
        RawWeather::OpenMeteo {
            place: GeocodeMatch {
                name: "Orlando".to_string(),
                latitude: 28.54,
                longitude: -81.38,
                country: Some("United States".to_string()),
            },
            forecast: json!({ "current_weather": { "temperature": 30.0, "weathercode": 2 } }),
        }
    }

    fn stored_report(source: Source) -> WeatherReport {
        WeatherReport {
            name: "Orlando".to_string(),
            temperature_celsius: Some(25.0),
            description: "cached".to_string(),
            icon: "☁️".to_string(),
            source_id: source,
        }
    }

    async fn seed(
        repo: &InMemoryExternalDataRepository,
        source: Source,
        key: &str,
        age: Duration,
    ) -> ExternalData {
        let record = NewExternalData::from_report(source, key, &stored_report(source))
            .unwrap()
            .fetched_at(Utc::now() - age);
        repo.append(record).await.unwrap()
    }

    fn service(
        repo: Arc<dyn ExternalDataRepository>,
        keyed: MockWeatherProvider,
        keyless: MockWeatherProvider,
    ) -> WeatherService {
        WeatherService::new(
            repo,
            Arc::new(keyed),
            Arc::new(keyless),
            Duration::minutes(10),
        )
    }

    #[tokio::test]
    async fn test_fresh_record_is_returned_without_provider_calls() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());
        let seeded = seed(&repo, Source::OpenWeather, "Orlando", Duration::minutes(5)).await;

        let mut keyed = keyed_provider(true);
        keyed.expect_fetch().times(0);
        let mut keyless = keyless_provider();
        keyless.expect_fetch().times(0);

        let lookup = service(repo.clone(), keyed, keyless)
            .fetch_weather("Orlando")
            .await
            .unwrap();

        assert_eq!(lookup.origin, LookupOrigin::Cache);
        assert_eq!(lookup.record, seeded);
        assert_eq!(lookup.report, stored_report(Source::OpenWeather));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_stale_record_triggers_fetch() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());
        seed(&repo, Source::OpenWeather, "Orlando", Duration::minutes(15)).await;

        let mut keyed = keyed_provider(true);
        keyed
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(openweather_raw()));
        let mut keyless = keyless_provider();
        keyless.expect_fetch().times(0);

        let lookup = service(repo.clone(), keyed, keyless)
            .fetch_weather("Orlando")
            .await
            .unwrap();

        assert_eq!(lookup.origin, LookupOrigin::Provider(Source::OpenWeather));
        assert_eq!(lookup.record.source, "openweather");
        assert_eq!(lookup.report.description, "clear sky");
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_lanes_are_not_shared_between_providers() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());
        seed(&repo, Source::OpenMeteo, "Orlando", Duration::minutes(1)).await;

        let mut keyed = keyed_provider(true);
        keyed
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(openweather_raw()));

        let lookup = service(repo, keyed, keyless_provider())
            .fetch_weather("Orlando")
            .await
            .unwrap();

        assert_eq!(lookup.origin, LookupOrigin::Provider(Source::OpenWeather));
    }

    #[tokio::test]
    async fn test_no_credential_never_calls_keyed_provider() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());

        let mut keyed = keyed_provider(false);
        keyed.expect_fetch().times(0);
        let mut keyless = keyless_provider();
        keyless
            .expect_fetch()
            .withf(|key| key == "Orlando")
            .times(1)
            .returning(|_| Ok(open_meteo_raw()));

        let lookup = service(repo.clone(), keyed, keyless)
            .fetch_weather("Orlando")
            .await
            .unwrap();

        assert_eq!(lookup.origin, LookupOrigin::Provider(Source::OpenMeteo));
        assert_eq!(lookup.record.source, "open-meteo");
        assert_eq!(lookup.report.description, "partly cloudy");
    }

    #[tokio::test]
    async fn test_no_credential_uses_keyless_lane_for_cache() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());
        seed(&repo, Source::OpenMeteo, "Orlando", Duration::minutes(2)).await;

        let mut keyed = keyed_provider(false);
        keyed.expect_fetch().times(0);
        let mut keyless = keyless_provider();
        keyless.expect_fetch().times(0);

        let lookup = service(repo, keyed, keyless)
            .fetch_weather("Orlando")
            .await
            .unwrap();

        assert!(lookup.origin.is_cache_hit());
        assert_eq!(lookup.record.source, "open-meteo");
    }

    #[tokio::test]
    async fn test_keyed_success_skips_keyless() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());

        let mut keyed = keyed_provider(true);
        keyed
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(openweather_raw()));
        let mut keyless = keyless_provider();
        keyless.expect_fetch().times(0);

        let lookup = service(repo.clone(), keyed, keyless)
            .fetch_weather("Orlando")
            .await
            .unwrap();

        let stored = repo.most_recent("openweather", "Orlando").await.unwrap().unwrap();
        assert_eq!(stored, lookup.record);
        assert_eq!(stored.report().unwrap(), lookup.report);
    }

    #[tokio::test]
    async fn test_keyed_transient_failure_falls_back_to_keyless() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());

        let mut keyed = keyed_provider(true);
        keyed
            .expect_fetch()
            .times(1)
            .returning(|_| Err(ProviderError::Status(500)));
        let mut keyless = keyless_provider();
        keyless
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(open_meteo_raw()));

        let lookup = service(repo.clone(), keyed, keyless)
            .fetch_weather("Orlando")
            .await
            .unwrap();

        assert_eq!(lookup.record.source, "open-meteo");
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_keyed_malformed_payload_falls_back() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());

        let mut keyed = keyed_provider(true);
        keyed
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(RawWeather::OpenWeather(json!({ "cod": 200 }))));
        let mut keyless = keyless_provider();
        keyless
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(open_meteo_raw()));

        let lookup = service(repo.clone(), keyed, keyless)
            .fetch_weather("Orlando")
            .await
            .unwrap();

        assert_eq!(lookup.origin, LookupOrigin::Provider(Source::OpenMeteo));
        assert!(repo.most_recent("openweather", "Orlando").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_not_configured_keyed_provider_is_skipped() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());

        let mut keyed = keyed_provider(true);
        keyed
            .expect_fetch()
            .times(1)
            .returning(|_| Err(ProviderError::NotConfigured));
        let mut keyless = keyless_provider();
        keyless
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(open_meteo_raw()));

        let lookup = service(repo.clone(), keyed, keyless)
            .fetch_weather("Orlando")
            .await
            .unwrap();

        assert_eq!(lookup.origin, LookupOrigin::Provider(Source::OpenMeteo));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_both_providers_failing_persists_one_placeholder() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());

        let mut keyed = keyed_provider(true);
        keyed
            .expect_fetch()
            .times(1)
            .returning(|_| Err(ProviderError::Transport("connection refused".to_string())));
        let mut keyless = keyless_provider();
        keyless
            .expect_fetch()
            .times(1)
            .returning(|key| Err(ProviderError::NoGeocodeMatch(key.to_string())));

        let lookup = service(repo.clone(), keyed, keyless)
            .fetch_weather("Orlando")
            .await
            .unwrap();

        assert_eq!(lookup.origin, LookupOrigin::Placeholder);
        assert_eq!(repo.len().await, 1);

        let stored = repo
            .most_recent("mock-openweather", "Orlando")
            .await
            .unwrap()
            .unwrap();
        let report = stored.report().unwrap();
        assert_eq!(report.description, "clear sky");
        assert_eq!(
            report.temperature_celsius,
            Some(normalizer::PLACEHOLDER_TEMPERATURE_CELSIUS)
        );
        assert_eq!(report.source_id, Source::Placeholder);
    }

    #[tokio::test]
    async fn test_no_credential_and_no_geocode_match_yields_placeholder() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());

        let mut keyed = keyed_provider(false);
        keyed.expect_fetch().times(0);
        let mut keyless = keyless_provider();
        keyless
            .expect_fetch()
            .times(1)
            .returning(|key| Err(ProviderError::NoGeocodeMatch(key.to_string())));

        let lookup = service(repo, keyed, keyless)
            .fetch_weather("Nowhereville")
            .await
            .unwrap();

        assert_eq!(lookup.record.source, "mock-openweather");
        assert_eq!(lookup.report.description, "clear sky");
        assert_eq!(lookup.report.name, "Nowhereville");
    }

    #[tokio::test]
    async fn test_rate_limit_propagates_without_fallback_or_persistence() {
        let mut repo = MockExternalDataRepository::new();
        repo.expect_most_recent().times(1).returning(|_, _| Ok(None));
        repo.expect_append().times(0);

        let mut keyed = keyed_provider(true);
        keyed
            .expect_fetch()
            .times(1)
            .returning(|_| Err(ProviderError::RateLimited));
        let mut keyless = keyless_provider();
        keyless.expect_fetch().times(0);

        let result = service(Arc::new(repo), keyed, keyless)
            .fetch_weather("Orlando")
            .await;

        assert!(matches!(result, Err(AppError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_cache_read_error_is_treated_as_miss() {
        let mut repo = MockExternalDataRepository::new();
        repo.expect_most_recent()
            .times(1)
            .returning(|_, _| Err(AppError::internal("Database error")));
        repo.expect_append().times(1).returning(|new_record| {
            Ok(ExternalData::new(
                7,
                new_record.source,
                new_record.key_name,
                new_record.payload,
                Utc::now(),
            ))
        });

        let mut keyed = keyed_provider(true);
        keyed
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(openweather_raw()));

        let lookup = service(Arc::new(repo), keyed, keyless_provider())
            .fetch_weather("Orlando")
            .await
            .unwrap();

        assert_eq!(lookup.record.id, 7);
        assert_eq!(lookup.origin, LookupOrigin::Provider(Source::OpenWeather));
    }

    #[tokio::test]
    async fn test_persist_failure_is_surfaced() {
        let mut repo = MockExternalDataRepository::new();
        repo.expect_most_recent().returning(|_, _| Ok(None));
        repo.expect_append()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error")));

        let mut keyed = keyed_provider(true);
        keyed
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(openweather_raw()));

        let result = service(Arc::new(repo), keyed, keyless_provider())
            .fetch_weather("Orlando")
            .await;

        assert!(matches!(result, Err(AppError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_latest_ignores_freshness() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());
        let old = seed(&repo, Source::OpenWeather, "Orlando", Duration::days(3)).await;

        let svc = service(repo, keyed_provider(true), keyless_provider());

        assert_eq!(svc.latest("openweather", "Orlando").await.unwrap(), old);
        assert!(matches!(
            svc.latest("openweather", "Tampa").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_placeholder_is_retrievable_through_latest() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());

        let mut keyless = keyless_provider();
        keyless
            .expect_fetch()
            .returning(|_| Err(ProviderError::Status(502)));

        let svc = service(repo, keyed_provider(false), keyless);
        let lookup = svc.fetch_weather("Orlando").await.unwrap();

        let latest = svc.latest("mock-openweather", "Orlando").await.unwrap();
        assert_eq!(latest, lookup.record);
    }

    #[test]
    fn test_intended_source_follows_credential() {
        let repo = Arc::new(InMemoryExternalDataRepository::new());
        let with_key = service(repo.clone(), keyed_provider(true), keyless_provider());
        let without_key = service(repo, keyed_provider(false), keyless_provider());

        assert_eq!(with_key.intended_source(), Source::OpenWeather);
        assert_eq!(without_key.intended_source(), Source::OpenMeteo);
    }
}
