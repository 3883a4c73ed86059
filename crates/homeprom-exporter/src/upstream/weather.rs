//! Open-Meteo current-weather client.

use async_trait::async_trait;
use serde::Deserialize;

use homeprom_core::error::{HomepromError, Result};
use homeprom_core::{Reading, Unit};

use super::{get_body, Upstream};

const SOURCE: &str = "weather";

pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
}

impl WeatherClient {
    pub fn new(http: reqwest::Client, base_url: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            latitude,
            longitude,
        }
    }
}

/// Current conditions at the configured coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub temperature: Reading,
    pub windspeed: Option<Reading>,
}

#[async_trait]
impl Upstream for WeatherClient {
    type Reading = WeatherReading;

    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self) -> Result<WeatherReading> {
        let req = self.http.get(&self.base_url).query(&[
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("current_weather", "true".to_string()),
        ]);
        let body = get_body(SOURCE, req).await?;
        decode_weather(&body, &format!("{},{}", self.latitude, self.longitude))
    }
}

#[derive(Debug, Deserialize)]
struct Forecast {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    #[serde(default)]
    windspeed: Option<f64>,
    #[serde(default)]
    time: Option<String>,
}

pub fn decode_weather(body: &[u8], location: &str) -> Result<WeatherReading> {
    let f: Forecast = serde_json::from_slice(body).map_err(|e| HomepromError::decode(SOURCE, e.to_string()))?;
    let cw = f.current_weather;
    Ok(WeatherReading {
        temperature: Reading::new(location, "temperature", cw.temperature, Unit::Native)
            .with_observed_at(cw.time.clone()),
        windspeed: cw
            .windspeed
            .map(|w| Reading::new(location, "windspeed", w, Unit::Native).with_observed_at(cw.time)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_current_temperature() {
        let r = decode_weather(br#"{"current_weather":{"temperature":5.5}}"#, "52.52,13.41").unwrap();
        assert_eq!(r.temperature.value(), 5.5);
        assert_eq!(r.temperature.id, "52.52,13.41");
        assert!(r.windspeed.is_none());
    }

    #[test]
    fn decodes_windspeed_when_present() {
        let body = br#"{"latitude":52.52,"current_weather":{"temperature":-1.25,"windspeed":12.4,"time":"2024-01-01T10:00"}}"#;
        let r = decode_weather(body, "x").unwrap();
        assert_eq!(r.temperature.value(), -1.25);
        assert_eq!(r.windspeed.unwrap().value(), 12.4);
    }

    #[test]
    fn missing_current_weather_is_decode_error() {
        let err = decode_weather(br#"{"hourly":{}}"#, "x").unwrap_err();
        assert_eq!(err.kind(), homeprom_core::ErrorKind::Decode);
    }
}
