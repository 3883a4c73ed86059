use async_trait::async_trait;

use homeprom_core::error::Result;
use homeprom_core::exposition::{Desc, MetricFamily};

use super::{Collector, Feed};
use crate::upstream::QuoteClient;

/// Single label-less gauge with the scraped price.
pub struct QuoteCollector {
    feed: Feed<QuoteClient>,
    price: Desc,
}

impl QuoteCollector {
    pub fn new(feed: Feed<QuoteClient>, metric: &str, url: &str) -> Result<Self> {
        Ok(Self {
            feed,
            price: Desc::gauge(metric, format!("The last recorded price scraped from {url}"), &[])?,
        })
    }
}

#[async_trait]
impl Collector for QuoteCollector {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn describe(&self) -> Vec<Desc> {
        vec![self.price.clone()]
    }

    async fn collect(&self) -> Result<Vec<MetricFamily>> {
        let mut fam = MetricFamily::new(self.price.clone());
        if let Some(reading) = self.feed.current().await? {
            fam.push(&[], reading.value())?;
        }
        Ok(vec![fam])
    }
}
