//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::WeatherService;
use crate::infrastructure::cache::CacheService;

#[derive(Clone)]
pub struct AppState {
    pub weather_service: Arc<WeatherService>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(weather_service: Arc<WeatherService>, cache: Arc<dyn CacheService>) -> Self {
        Self {
            weather_service,
            cache,
        }
    }
}
