//! Environment-variable config source.
//!
//! Mirrors the YAML schema so both paths share [`ExporterConfig::validate`].
//! Reading goes through a lookup closure; [`from_env`] plugs in `std::env`.

use homeprom_core::error::{HomepromError, Result};
use homeprom_core::LabelMapping;

use super::schema::{
    default_weather_base_url, parse_duration, ExporterConfig, FeedMode, HueConfig, QuoteConfig, RefreshSection,
    ServerSection, WeatherConfig,
};

pub const SOURCES: &str = "HOMEPROM_SOURCES";
pub const LISTEN_PORT: &str = "LISTEN_PORT";
pub const REFRESH_INTERVAL: &str = "REFRESH_INTERVAL";
pub const HTTP_TIMEOUT: &str = "HTTP_TIMEOUT";
pub const HUE_BRIDGE_IP: &str = "HUE_BRIDGE_IP";
pub const HUE_API_KEY: &str = "HUE_API_KEY";
pub const HUE_SENSOR_LABELS: &str = "HUE_SENSOR_LABELS";
pub const HUE_MODE: &str = "HUE_MODE";
pub const WEATHER_LATITUDE: &str = "WEATHER_LATITUDE";
pub const WEATHER_LONGITUDE: &str = "WEATHER_LONGITUDE";
pub const WEATHER_BASE_URL: &str = "WEATHER_BASE_URL";
pub const QUOTE_URL: &str = "QUOTE_URL";
pub const QUOTE_SELECTOR: &str = "QUOTE_SELECTOR";
pub const QUOTE_METRIC: &str = "QUOTE_METRIC";

pub fn from_env() -> Result<ExporterConfig> {
    from_lookup(|k| std::env::var(k).ok())
}

/// Build and validate a config from an arbitrary key lookup. Blank values
/// count as unset.
pub fn from_lookup<F>(get: F) -> Result<ExporterConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let require = |k: &str| get(k).ok_or_else(|| HomepromError::Config(format!("{k} environment variable not set")));

    let sources = get(SOURCES).unwrap_or_else(|| "hue".to_string());
    let mut want_hue = false;
    let mut want_weather = false;
    let mut want_quote = false;
    for s in sources.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match s {
            "hue" => want_hue = true,
            "weather" => want_weather = true,
            "quote" => want_quote = true,
            other => {
                return Err(HomepromError::Config(format!("{SOURCES}: unknown source {other:?}")));
            }
        }
    }

    let mut server = ServerSection::default();
    if let Some(port) = get(LISTEN_PORT) {
        let port: u16 = port
            .parse()
            .map_err(|e| HomepromError::Config(format!("{LISTEN_PORT} must be a port number: {e}")))?;
        server.listen = format!("0.0.0.0:{port}");
    }

    let mut refresh = RefreshSection::default();
    if let Some(v) = get(REFRESH_INTERVAL) {
        refresh.interval = parse_duration(&v)?;
    }
    if let Some(v) = get(HTTP_TIMEOUT) {
        refresh.http_timeout = parse_duration(&v)?;
    }

    let mode = |k: &str| get(k).map(|v| FeedMode::parse(&v)).transpose().map(Option::unwrap_or_default);

    let hue = if want_hue {
        Some(HueConfig {
            bridge: require(HUE_BRIDGE_IP)?,
            api_key: require(HUE_API_KEY)?,
            labels: match get(HUE_SENSOR_LABELS) {
                Some(raw) => LabelMapping::from_json(&raw)?,
                None => LabelMapping::default(),
            },
            mode: mode(HUE_MODE)?,
            interval: None,
        })
    } else {
        None
    };

    let weather = if want_weather {
        Some(WeatherConfig {
            latitude: parse_coord(WEATHER_LATITUDE, &require(WEATHER_LATITUDE)?)?,
            longitude: parse_coord(WEATHER_LONGITUDE, &require(WEATHER_LONGITUDE)?)?,
            base_url: get(WEATHER_BASE_URL).unwrap_or_else(default_weather_base_url),
            mode: FeedMode::Cached,
            interval: None,
        })
    } else {
        None
    };

    let quote = if want_quote {
        let mut q = QuoteConfig::default();
        if let Some(v) = get(QUOTE_URL) {
            q.url = v;
        }
        if let Some(v) = get(QUOTE_SELECTOR) {
            q.selector = v;
        }
        if let Some(v) = get(QUOTE_METRIC) {
            q.metric = v;
        }
        Some(q)
    } else {
        None
    };

    let cfg = ExporterConfig {
        version: 1,
        server,
        refresh,
        hue,
        weather,
        quote,
    };
    cfg.validate()?;
    Ok(cfg)
}

fn parse_coord(key: &str, v: &str) -> Result<f64> {
    v.parse()
        .map_err(|e| HomepromError::Config(format!("{key} must be a decimal number: {e}")))
}
