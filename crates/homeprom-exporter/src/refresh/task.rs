//! Periodic refresh task.
//!
//! A [`RefreshTask`] is built without side effects and only starts polling
//! when [`Refresh::start`] is called. The first fetch happens immediately,
//! then once per interval. Fetches for one source never overlap: the loop
//! awaits each fetch before waiting for the next tick, and missed ticks are
//! delayed rather than bursted.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use homeprom_core::error::Result;

use crate::obs::ExporterMetrics;
use crate::refresh::MetricCache;
use crate::upstream::Upstream;

pub struct RefreshTask<U: Upstream> {
    upstream: Arc<U>,
    cache: Arc<MetricCache<U::Reading>>,
    interval: Duration,
    metrics: Arc<ExporterMetrics>,
}

impl<U: Upstream> RefreshTask<U> {
    pub fn new(
        upstream: Arc<U>,
        cache: Arc<MetricCache<U::Reading>>,
        interval: Duration,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self {
            upstream,
            cache,
            interval,
            metrics,
        }
    }

    /// One fetch-and-store cycle. On failure the cache is left untouched.
    pub async fn refresh_once(&self) -> Result<()> {
        let source = self.upstream.name();
        let started = Instant::now();
        let res = self.upstream.fetch().await;
        let elapsed = started.elapsed();

        match res {
            Ok(reading) => {
                self.cache.write(reading).await;
                self.metrics.record_refresh(source, "ok", elapsed);
                tracing::debug!(source = %source, elapsed_ms = elapsed.as_millis() as u64, "refresh ok");
                Ok(())
            }
            Err(e) => {
                self.metrics.record_refresh(source, e.kind().as_str(), elapsed);
                Err(e)
            }
        }
    }

    async fn run(self) {
        let source = self.upstream.name();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(source = %source, interval = ?self.interval, "refresh loop started");
        loop {
            // first tick completes immediately
            ticker.tick().await;
            if let Err(e) = self.refresh_once().await {
                tracing::warn!(source = %source, error = %e, "refresh failed, keeping last value");
            }
        }
    }
}

/// Handle to a running refresh loop. Dropping it leaves the task running;
/// [`RefreshHandle::abort`] stops it.
pub struct RefreshHandle {
    source: &'static str,
    handle: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Object-safe start hook so tasks over different upstreams can be held together.
pub trait Refresh: Send {
    fn start(self: Box<Self>) -> RefreshHandle;
}

impl<U: Upstream> Refresh for RefreshTask<U> {
    fn start(self: Box<Self>) -> RefreshHandle {
        let source = self.upstream.name();
        RefreshHandle {
            source,
            handle: tokio::spawn(self.run()),
        }
    }
}
