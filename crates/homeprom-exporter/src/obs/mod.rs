//! Exporter self-observability.
//!
//! Refresh outcomes, refresh latency, and scrape-path collector failures are
//! tracked in-process with atomics and appended to every `/metrics` response.

pub mod metrics;

pub use metrics::ExporterMetrics;
