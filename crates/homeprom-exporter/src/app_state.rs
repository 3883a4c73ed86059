//! Shared application state for the exporter.
//!
//! Builds clients, caches, collectors, and refresh tasks from config. Nothing
//! is spawned here: the returned refresh tasks start only when the caller
//! starts them, so construction stays side-effect free.

use std::sync::Arc;
use std::time::Duration;

use homeprom_core::error::Result;

use crate::collect::{Collector, Feed, HueCollector, QuoteCollector, Registry, WeatherCollector};
use crate::config::{ExporterConfig, FeedMode};
use crate::obs::ExporterMetrics;
use crate::refresh::{CacheStatus, MetricCache, Refresh, RefreshTask};
use crate::upstream::{build_http_client, HueClient, QuoteClient, Upstream, WeatherClient};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    registry: Registry,
    metrics: Arc<ExporterMetrics>,
    caches: Vec<(&'static str, Arc<dyn CacheStatus>)>,
}

/// Collects what each configured source contributes while the state is built.
struct Wiring {
    metrics: Arc<ExporterMetrics>,
    registry: Registry,
    caches: Vec<(&'static str, Arc<dyn CacheStatus>)>,
    tasks: Vec<Box<dyn Refresh>>,
}

impl Wiring {
    /// Turn an upstream into a feed. Cached feeds get a cache and an
    /// unstarted refresh task.
    fn feed<U: Upstream>(&mut self, upstream: U, mode: FeedMode, interval: Duration) -> Feed<U> {
        let upstream = Arc::new(upstream);
        match mode {
            FeedMode::Direct => Feed::Direct(upstream),
            FeedMode::Cached => {
                let cache = Arc::new(MetricCache::new());
                self.caches.push((upstream.name(), Arc::clone(&cache) as Arc<dyn CacheStatus>));
                self.tasks.push(Box::new(RefreshTask::new(
                    upstream,
                    Arc::clone(&cache),
                    interval,
                    Arc::clone(&self.metrics),
                )));
                Feed::Cached(cache)
            }
        }
    }

    fn register(&self, collector: impl Collector + 'static) -> Result<()> {
        self.registry.register(Arc::new(collector))
    }
}

impl AppState {
    /// Build application state plus the refresh tasks to start.
    /// Returns Result so main can report config errors and exit.
    pub fn new(cfg: ExporterConfig) -> Result<(Self, Vec<Box<dyn Refresh>>)> {
        let http = build_http_client(cfg.refresh.http_timeout)?;
        let metrics = Arc::new(ExporterMetrics::new());
        let mut w = Wiring {
            registry: Registry::new(Arc::clone(&metrics)),
            metrics: Arc::clone(&metrics),
            caches: Vec::new(),
            tasks: Vec::new(),
        };

        if let Some(hue) = &cfg.hue {
            let client = HueClient::new(http.clone(), &hue.bridge, &hue.api_key);
            let feed = w.feed(client, hue.mode, cfg.interval_for(hue.interval));
            w.register(HueCollector::new(feed, hue.labels.clone())?)?;
            tracing::info!(mode = ?hue.mode, labels = hue.labels.len(), "hue source configured");
        }

        if let Some(weather) = &cfg.weather {
            let client = WeatherClient::new(http.clone(), &weather.base_url, weather.latitude, weather.longitude);
            let feed = w.feed(client, weather.mode, cfg.interval_for(weather.interval));
            w.register(WeatherCollector::new(feed, weather.latitude, weather.longitude)?)?;
            tracing::info!(mode = ?weather.mode, "weather source configured");
        }

        if let Some(quote) = &cfg.quote {
            let client = QuoteClient::new(http.clone(), &quote.url, &quote.selector)?;
            let feed = w.feed(client, quote.mode, cfg.interval_for(quote.interval));
            w.register(QuoteCollector::new(feed, &quote.metric, &quote.url)?)?;
            tracing::info!(mode = ?quote.mode, url = %quote.url, "quote source configured");
        }

        let state = Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry: w.registry,
                metrics,
                caches: w.caches,
            }),
        };
        Ok((state, w.tasks))
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn metrics(&self) -> Arc<ExporterMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    /// Cached sources that have not completed a successful refresh yet.
    pub fn warming_sources(&self) -> Vec<&'static str> {
        self.inner
            .caches
            .iter()
            .filter(|(_, c)| !c.is_populated())
            .map(|(name, _)| *name)
            .collect()
    }
}
