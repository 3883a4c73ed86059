//! Background refresh: per-source caches and the timer tasks that fill them.

pub mod cache;
pub mod task;

pub use cache::{CacheStatus, MetricCache};
pub use task::{Refresh, RefreshHandle, RefreshTask};
