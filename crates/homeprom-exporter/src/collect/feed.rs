use std::sync::Arc;

use homeprom_core::error::Result;

use crate::refresh::MetricCache;
use crate::upstream::Upstream;

/// Where a collector gets its reading from.
pub enum Feed<U: Upstream> {
    /// Read whatever the refresh loop last stored. Never does IO.
    Cached(Arc<MetricCache<U::Reading>>),
    /// Fetch on the scrape path. Scrape latency follows upstream latency.
    Direct(Arc<U>),
}

impl<U: Upstream> Clone for Feed<U> {
    fn clone(&self) -> Self {
        match self {
            Feed::Cached(c) => Feed::Cached(Arc::clone(c)),
            Feed::Direct(u) => Feed::Direct(Arc::clone(u)),
        }
    }
}

impl<U: Upstream> Feed<U> {
    /// `Ok(None)` means a cached feed that has not been filled yet.
    pub async fn current(&self) -> Result<Option<Arc<U::Reading>>> {
        match self {
            Feed::Cached(cache) => Ok(cache.read().await),
            Feed::Direct(upstream) => upstream.fetch().await.map(|r| Some(Arc::new(r))),
        }
    }
}
