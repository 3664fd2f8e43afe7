#![allow(dead_code)]

use axum::ServiceExt;
use axum::extract::Request;
use axum::{Router, routing::get};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use weather_relay::api::handlers::health_handler;
use weather_relay::api::routes::external_routes;
use weather_relay::application::services::WeatherService;
use weather_relay::domain::repositories::ExternalDataRepository;
use weather_relay::infrastructure::cache::NullCache;
use weather_relay::infrastructure::persistence::InMemoryExternalDataRepository;
use weather_relay::infrastructure::providers::{
    OpenMeteoClient, OpenWeatherClient, build_http_client,
};
use weather_relay::routes::app_router;
use weather_relay::state::AppState;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-openweather-key";

/// A service wired to wiremock upstreams and an in-memory store.
pub struct TestContext {
    pub state: AppState,
    pub repo: Arc<InMemoryExternalDataRepository>,
    pub openweather: MockServer,
    pub geocoding: MockServer,
    pub forecast: MockServer,
}

impl TestContext {
    pub async fn new(api_key: Option<&str>) -> Self {
        let repo = Arc::new(InMemoryExternalDataRepository::new());
        Self::with_repository(api_key, repo.clone(), repo).await
    }

    /// Uses `store` for the service while still exposing `repo` for assertions.
    pub async fn with_repository(
        api_key: Option<&str>,
        store: Arc<dyn ExternalDataRepository>,
        repo: Arc<InMemoryExternalDataRepository>,
    ) -> Self {
        let openweather = MockServer::start().await;
        let geocoding = MockServer::start().await;
        let forecast = MockServer::start().await;

        let http = build_http_client(Duration::from_secs(2)).unwrap();
        let keyed = Arc::new(OpenWeatherClient::new(
            http.clone(),
            openweather.uri(),
            api_key.map(str::to_string),
        ));
        let keyless = Arc::new(OpenMeteoClient::new(http, geocoding.uri(), forecast.uri()));

        let service = Arc::new(WeatherService::new(
            store,
            keyed,
            keyless,
            chrono::Duration::minutes(10),
        ));

        let state = AppState::new(service, Arc::new(NullCache::new()));

        Self {
            state,
            repo,
            openweather,
            geocoding,
            forecast,
        }
    }

    /// Application routes without the rate limiter, which needs a peer address.
    pub fn app(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .nest("/external", external_routes())
            .nest("/api/external", external_routes())
            .with_state(self.state.clone())
    }

    /// Serves the production router, rate limiter included, on an ephemeral
    /// port and returns its address.
    pub async fn serve_app_router(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = app_router(self.state.clone(), false);

        tokio::spawn(async move {
            axum::serve(
                listener,
                ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
            )
            .await
            .unwrap();
        });

        addr
    }

    pub async fn mount_openweather(&self, city: &str, template: ResponseTemplate, times: u64) {
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", city))
            .and(query_param("appid", TEST_API_KEY))
            .and(query_param("units", "metric"))
            .respond_with(template)
            .expect(times)
            .mount(&self.openweather)
            .await;
    }

    pub async fn mount_geocode(&self, city: &str, template: ResponseTemplate, times: u64) {
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", city))
            .and(query_param("count", "1"))
            .respond_with(template)
            .expect(times)
            .mount(&self.geocoding)
            .await;
    }

    pub async fn mount_forecast(&self, template: ResponseTemplate, times: u64) {
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("current_weather", "true"))
            .respond_with(template)
            .expect(times)
            .mount(&self.forecast)
            .await;
    }
}

pub fn openweather_body(name: &str, temp: f64, description: &str, icon: &str) -> Value {
    json!({
        "coord": { "lon": -81.38, "lat": 28.54 },
        "weather": [
            { "id": 800, "main": "Clear", "description": description, "icon": icon }
        ],
        "main": { "temp": temp, "feels_like": temp, "humidity": 60 },
        "name": name,
        "cod": 200
    })
}

pub fn geocode_body(name: &str, latitude: f64, longitude: f64) -> Value {
    json!({
        "results": [
            {
                "id": 4167147,
                "name": name,
                "latitude": latitude,
                "longitude": longitude,
                "country": "United States"
            }
        ],
        "generationtime_ms": 0.5
    })
}

pub fn forecast_body(temperature: f64, weathercode: i64) -> Value {
    json!({
        "latitude": 28.54,
        "longitude": -81.38,
        "current_weather": {
            "temperature": temperature,
            "windspeed": 10.2,
            "winddirection": 90,
            "weathercode": weathercode,
            "time": "2026-10-15T12:00"
        }
    })
}

pub fn ok_json(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}
