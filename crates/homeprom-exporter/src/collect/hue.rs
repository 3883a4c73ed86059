use async_trait::async_trait;

use homeprom_core::error::Result;
use homeprom_core::exposition::{Desc, MetricFamily};
use homeprom_core::LabelMapping;

use super::{Collector, Feed};
use crate::upstream::HueClient;

pub const HUE_TEMPERATURE: &str = "hue_temperature";

/// `hue_temperature{room, sensor_name, sensor_id}` in °C. `room` comes from the
/// label mapping keyed by sensor name; unmapped sensors get `Unknown`.
pub struct HueCollector {
    feed: Feed<HueClient>,
    labels: LabelMapping,
    temperature: Desc,
}

impl HueCollector {
    pub fn new(feed: Feed<HueClient>, labels: LabelMapping) -> Result<Self> {
        Ok(Self {
            feed,
            labels,
            temperature: Desc::gauge(
                HUE_TEMPERATURE,
                "Current temperature readings from Hue sensors",
                &["room", "sensor_name", "sensor_id"],
            )?,
        })
    }
}

#[async_trait]
impl Collector for HueCollector {
    fn name(&self) -> &'static str {
        "hue"
    }

    fn describe(&self) -> Vec<Desc> {
        vec![self.temperature.clone()]
    }

    async fn collect(&self) -> Result<Vec<MetricFamily>> {
        let mut fam = MetricFamily::new(self.temperature.clone());
        if let Some(readings) = self.feed.current().await? {
            for r in readings.iter() {
                fam.push(&[self.labels.resolve(&r.name), r.name.as_str(), r.id.as_str()], r.value())?;
            }
        }
        Ok(vec![fam])
    }
}
