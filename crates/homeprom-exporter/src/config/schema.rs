use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use homeprom_core::error::{HomepromError, Result};
use homeprom_core::exposition::is_valid_metric_name;
use homeprom_core::LabelMapping;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub refresh: RefreshSection,

    #[serde(default)]
    pub hue: Option<HueConfig>,

    #[serde(default)]
    pub weather: Option<WeatherConfig>,

    #[serde(default)]
    pub quote: Option<QuoteConfig>,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HomepromError::Config(format!("unsupported config version {}", self.version)));
        }
        if self.hue.is_none() && self.weather.is_none() && self.quote.is_none() {
            return Err(HomepromError::Config("at least one source (hue, weather, quote) must be configured".into()));
        }

        self.server.validate()?;
        self.refresh.validate()?;

        if let Some(hue) = &self.hue {
            hue.validate()?;
            self.check_interval("hue", hue.interval)?;
        }
        if let Some(weather) = &self.weather {
            weather.validate()?;
            self.check_interval("weather", weather.interval)?;
        }
        if let Some(quote) = &self.quote {
            quote.validate()?;
            self.check_interval("quote", quote.interval)?;
        }
        Ok(())
    }

    /// Effective refresh interval for a source.
    pub fn interval_for(&self, override_: Option<Duration>) -> Duration {
        override_.unwrap_or(self.refresh.interval)
    }

    fn check_interval(&self, source: &str, override_: Option<Duration>) -> Result<()> {
        let interval = self.interval_for(override_);
        if interval < Duration::from_secs(1) {
            return Err(HomepromError::Config(format!("{source}.interval must be at least 1s")));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| HomepromError::Config(format!("server.listen must be a valid SocketAddr: {e}")))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshSection {
    #[serde(default = "default_interval", deserialize_with = "duration_str")]
    pub interval: Duration,

    #[serde(default = "default_http_timeout", deserialize_with = "duration_str")]
    pub http_timeout: Duration,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            http_timeout: default_http_timeout(),
        }
    }
}

impl RefreshSection {
    pub fn validate(&self) -> Result<()> {
        if self.interval < Duration::from_secs(1) {
            return Err(HomepromError::Config("refresh.interval must be at least 1s".into()));
        }
        if self.http_timeout.is_zero() {
            return Err(HomepromError::Config("refresh.http_timeout must be positive".into()));
        }
        Ok(())
    }
}

/// Whether a source is read from a background-refreshed cache or fetched on
/// the scrape path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    #[default]
    Cached,
    Direct,
}

impl FeedMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cached" => Ok(FeedMode::Cached),
            "direct" => Ok(FeedMode::Direct),
            other => Err(HomepromError::Config(format!("unknown feed mode {other:?} (cached|direct)"))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HueConfig {
    /// Bridge host, optionally with port or scheme.
    pub bridge: String,
    pub api_key: String,

    /// Sensor name -> room.
    #[serde(default)]
    pub labels: LabelMapping,

    #[serde(default)]
    pub mode: FeedMode,

    #[serde(default, deserialize_with = "opt_duration_str")]
    pub interval: Option<Duration>,
}

impl HueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bridge.trim().is_empty() {
            return Err(HomepromError::Config("hue.bridge must not be empty".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(HomepromError::Config("hue.api_key must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherConfig {
    pub latitude: f64,
    pub longitude: f64,

    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub mode: FeedMode,

    #[serde(default, deserialize_with = "opt_duration_str")]
    pub interval: Option<Duration>,
}

impl WeatherConfig {
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(HomepromError::Config("weather.latitude must be between -90 and 90".into()));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(HomepromError::Config("weather.longitude must be between -180 and 180".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(HomepromError::Config("weather.base_url must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuoteConfig {
    #[serde(default = "default_quote_url")]
    pub url: String,

    #[serde(default = "default_quote_selector")]
    pub selector: String,

    #[serde(default = "default_quote_metric")]
    pub metric: String,

    #[serde(default)]
    pub mode: FeedMode,

    #[serde(default, deserialize_with = "opt_duration_str")]
    pub interval: Option<Duration>,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            url: default_quote_url(),
            selector: default_quote_selector(),
            metric: default_quote_metric(),
            mode: FeedMode::default(),
            interval: None,
        }
    }
}

impl QuoteConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(HomepromError::Config("quote.url must not be empty".into()));
        }
        scraper::Selector::parse(&self.selector)
            .map_err(|e| HomepromError::Config(format!("quote.selector is not a valid CSS selector: {e:?}")))?;
        if !is_valid_metric_name(&self.metric) {
            return Err(HomepromError::Config(format!("quote.metric {:?} is not a valid metric name", self.metric)));
        }
        Ok(())
    }
}

/// `"30s"`, `"5m"`, `"1h 30m"`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    humantime::parse_duration(s.trim()).map_err(|e| HomepromError::Config(format!("invalid duration {s:?}: {e}")))
}

fn duration_str<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Duration, D::Error> {
    let s = String::deserialize(d)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

fn opt_duration_str<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Duration>, D::Error> {
    match Option::<String>::deserialize(d)? {
        Some(s) => humantime::parse_duration(s.trim()).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_interval() -> Duration {
    Duration::from_secs(60)
}
fn default_http_timeout() -> Duration {
    Duration::from_secs(10)
}
pub(crate) fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1/forecast".into()
}
fn default_quote_url() -> String {
    "https://www.cnbc.com/quotes/.WORLD".into()
}
fn default_quote_selector() -> String {
    "span.QuoteStrip-lastPrice".into()
}
fn default_quote_metric() -> String {
    "msci_world_last_price".into()
}
