//! Metric adapters.
//!
//! A [`Collector`] turns the current state of one source into metric families.
//! Collectors read through a [`Feed`], which is either a background-refreshed
//! cache or a direct fetch on the scrape path. The [`Registry`] owns every
//! collector and gathers them for `/metrics`.

pub mod feed;
pub mod hue;
pub mod quote;
pub mod registry;
pub mod weather;

use async_trait::async_trait;

use homeprom_core::error::Result;
use homeprom_core::exposition::{Desc, MetricFamily};

pub use feed::Feed;
pub use hue::HueCollector;
pub use quote::QuoteCollector;
pub use registry::Registry;
pub use weather::WeatherCollector;

#[async_trait]
pub trait Collector: Send + Sync {
    /// Registry key; also the `collector` label on error counters.
    fn name(&self) -> &'static str;

    /// Every family this collector can emit.
    fn describe(&self) -> Vec<Desc>;

    /// Current observations. An error drops this collector from the current
    /// scrape only.
    async fn collect(&self) -> Result<Vec<MetricFamily>>;
}
