use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::join_all;

use homeprom_core::error::{HomepromError, Result};
use homeprom_core::exposition::text::encode;
use homeprom_core::exposition::MetricFamily;

use super::Collector;
use crate::obs::ExporterMetrics;

/// Collector registry. Owned by the app state, never global.
pub struct Registry {
    collectors: DashMap<&'static str, Arc<dyn Collector>>,
    /// family name -> owning collector
    families: DashMap<String, &'static str>,
    metrics: Arc<ExporterMetrics>,
}

impl Registry {
    pub fn new(metrics: Arc<ExporterMetrics>) -> Self {
        Self {
            collectors: DashMap::new(),
            families: DashMap::new(),
            metrics,
        }
    }

    /// Register a collector. Duplicate collector names or family names are
    /// rejected so a scrape never carries two `# TYPE` lines for one metric.
    pub fn register(&self, collector: Arc<dyn Collector>) -> Result<()> {
        let name = collector.name();
        if self.collectors.contains_key(name) {
            return Err(HomepromError::Config(format!("collector {name} registered twice")));
        }
        let descs = collector.describe();
        for d in &descs {
            if let Some(owner) = self.families.get(&d.name) {
                return Err(HomepromError::Config(format!(
                    "metric {} is emitted by both {} and {}",
                    d.name,
                    *owner,
                    name
                )));
            }
        }
        for d in descs {
            self.families.insert(d.name, name);
        }
        self.collectors.insert(name, collector);
        Ok(())
    }

    pub fn registered(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.collectors.iter().map(|e| *e.key()).collect();
        names.sort_unstable();
        names
    }

    /// Run every collector concurrently. Failing collectors are logged,
    /// counted, and left out; the rest are returned sorted by family name.
    pub async fn gather(&self) -> Vec<MetricFamily> {
        let collectors: Vec<Arc<dyn Collector>> = self.collectors.iter().map(|e| Arc::clone(e.value())).collect();

        let results = join_all(collectors.iter().map(|c| async move { (c.name(), c.collect().await) })).await;

        let mut families = Vec::new();
        for (name, res) in results {
            match res {
                Ok(mut fams) => families.append(&mut fams),
                Err(e) => {
                    tracing::warn!(collector = %name, error = %e, "collector failed, omitting from scrape");
                    self.metrics.record_collect_error(name);
                }
            }
        }
        families.sort_by(|a, b| a.desc.name.cmp(&b.desc.name));
        families
    }

    /// Full `/metrics` body: collector families, then self metrics.
    pub async fn render(&self) -> String {
        let mut out = encode(&self.gather().await);
        self.metrics.render(&mut out);
        out
    }
}
