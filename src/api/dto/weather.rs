//! Query parameters for the external weather endpoints.

use serde::Deserialize;
use validator::{Validate, ValidationError};

/// `GET /external/weather?city=<name>`
#[derive(Debug, Deserialize, Validate)]
pub struct WeatherQuery {
    /// Lookup key, used verbatim (case-sensitive, not trimmed).
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    #[validate(custom(function = "not_blank"))]
    pub city: String,
}

/// `GET /external/latest?source=<id>&key=<k>`
#[derive(Debug, Deserialize, Validate)]
pub struct LatestQuery {
    #[validate(custom(function = "not_blank"))]
    pub source: String,
    #[validate(custom(function = "not_blank"))]
    pub key: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
