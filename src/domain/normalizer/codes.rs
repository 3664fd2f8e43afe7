//! Fixed condition lookup tables.
//!
//! Every lookup is total: values outside an upstream's documented range
//! resolve to [`UNKNOWN`].

use std::collections::HashMap;
use std::sync::LazyLock;

/// A condition's human-readable summary and display glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub description: &'static str,
    pub glyph: &'static str,
}

pub const UNKNOWN: Condition = Condition {
    description: "unknown",
    glyph: "❔",
};

pub const CLEAR_SKY: Condition = Condition {
    description: "clear sky",
    glyph: "☀️",
};

/// OpenWeatherMap icon prefixes (`01d` / `01n` share `01`).
/// See <https://openweathermap.org/weather-conditions>.
static OPENWEATHER_ICON_PREFIXES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        HashMap::from([
            ("01", CLEAR_SKY.glyph),
            ("02", "🌤️"),
            ("03", "⛅"),
            ("04", "☁️"),
            ("09", "🌧️"),
            ("10", "🌦️"),
            ("11", "⛈️"),
            ("13", "❄️"),
            ("50", "🌫️"),
        ])
    });

const fn entry(description: &'static str, glyph: &'static str) -> Condition {
    Condition { description, glyph }
}

/// WMO weather interpretation codes as documented by Open-Meteo.
/// See <https://open-meteo.com/en/docs#weathervariables>.
static WMO_CODES: LazyLock<HashMap<i64, Condition>> = LazyLock::new(|| {
    HashMap::from([
        (0, CLEAR_SKY),
        (1, entry("mainly clear", "🌤️")),
        (2, entry("partly cloudy", "⛅")),
        (3, entry("overcast", "☁️")),
        (45, entry("fog", "🌫️")),
        (48, entry("depositing rime fog", "🌫️")),
        (51, entry("light drizzle", "🌦️")),
        (53, entry("moderate drizzle", "🌦️")),
        (55, entry("dense drizzle", "🌧️")),
        (56, entry("light freezing drizzle", "🌧️")),
        (57, entry("dense freezing drizzle", "🌧️")),
        (61, entry("slight rain", "🌧️")),
        (63, entry("moderate rain", "🌧️")),
        (65, entry("heavy rain", "🌧️")),
        (66, entry("light freezing rain", "🌨️")),
        (67, entry("heavy freezing rain", "🌨️")),
        (71, entry("slight snow fall", "🌨️")),
        (73, entry("moderate snow fall", "❄️")),
        (75, entry("heavy snow fall", "❄️")),
        (77, entry("snow grains", "❄️")),
        (80, entry("slight rain showers", "🌦️")),
        (81, entry("moderate rain showers", "🌧️")),
        (82, entry("violent rain showers", "⛈️")),
        (85, entry("slight snow showers", "🌨️")),
        (86, entry("heavy snow showers", "❄️")),
        (95, entry("thunderstorm", "⛈️")),
        (96, entry("thunderstorm with slight hail", "⛈️")),
        (99, entry("thunderstorm with heavy hail", "⛈️")),
    ])
});

/// Codes Open-Meteo documents for `weathercode`.
pub fn documented_wmo_codes() -> impl Iterator<Item = i64> {
    let mut codes: Vec<i64> = WMO_CODES.keys().copied().collect();
    codes.sort_unstable();
    codes.into_iter()
}

/// Icon prefixes OpenWeatherMap documents.
pub fn documented_icon_prefixes() -> impl Iterator<Item = &'static str> {
    let mut prefixes: Vec<&'static str> = OPENWEATHER_ICON_PREFIXES.keys().copied().collect();
    prefixes.sort_unstable();
    prefixes.into_iter()
}

/// Maps an OpenWeatherMap icon code (e.g. `"10n"`) to a glyph by its
/// two-character prefix.
pub fn openweather_icon_glyph(icon_code: &str) -> &'static str {
    icon_code
        .get(..2)
        .and_then(|prefix| OPENWEATHER_ICON_PREFIXES.get(prefix))
        .copied()
        .unwrap_or(UNKNOWN.glyph)
}

/// Maps a WMO weather code to its description and glyph.
pub fn wmo_condition(code: i64) -> Condition {
    WMO_CODES.get(&code).copied().unwrap_or(UNKNOWN)
}
