use async_trait::async_trait;

use homeprom_core::error::Result;
use homeprom_core::exposition::{Desc, MetricFamily};

use super::{Collector, Feed};
use crate::upstream::WeatherClient;

pub const WEATHER_TEMPERATURE: &str = "weather_temperature_celsius";
pub const WEATHER_WINDSPEED: &str = "weather_windspeed_kmh";

pub struct WeatherCollector {
    feed: Feed<WeatherClient>,
    latitude: String,
    longitude: String,
    temperature: Desc,
    windspeed: Desc,
}

impl WeatherCollector {
    pub fn new(feed: Feed<WeatherClient>, latitude: f64, longitude: f64) -> Result<Self> {
        let labels = ["latitude", "longitude"];
        Ok(Self {
            feed,
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
            temperature: Desc::gauge(WEATHER_TEMPERATURE, "Current air temperature at the configured location", &labels)?,
            windspeed: Desc::gauge(WEATHER_WINDSPEED, "Current wind speed at the configured location", &labels)?,
        })
    }
}

#[async_trait]
impl Collector for WeatherCollector {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn describe(&self) -> Vec<Desc> {
        vec![self.temperature.clone(), self.windspeed.clone()]
    }

    async fn collect(&self) -> Result<Vec<MetricFamily>> {
        let mut temperature = MetricFamily::new(self.temperature.clone());
        let mut windspeed = MetricFamily::new(self.windspeed.clone());
        let loc = [self.latitude.as_str(), self.longitude.as_str()];

        if let Some(reading) = self.feed.current().await? {
            temperature.push(&loc, reading.temperature.value())?;
            if let Some(w) = &reading.windspeed {
                windspeed.push(&loc, w.value())?;
            }
        }
        Ok(vec![temperature, windspeed])
    }
}
