//! Self metrics for the exporter.
//!
//! Counter/gauge/histogram types with dynamic labels backed by `DashMap`.
//! Labels are flattened into sorted key vectors to keep deterministic ordering.
//! Histogram buckets are fixed in microseconds to avoid floating point math.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use homeprom_core::exposition::text::{format_value, render_labels};

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    key.sort();
    key
}

/// Snapshot rows sorted by label key so output is stable across scrapes.
fn sorted<T, F: Fn(&T) -> R, R>(map: &DashMap<LabelKey, T>, f: F) -> Vec<(LabelKey, R)> {
    let mut rows: Vec<(LabelKey, R)> = map.iter().map(|r| (r.key().clone(), f(r.value()))).collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        let counter = self.map.entry(label_key(labels)).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} counter");
        for (key, val) in sorted(&self.map, |c| c.load(Ordering::Relaxed)) {
            let _ = writeln!(out, "{}{} {}", name, render_labels(&key), val);
        }
    }
}

/// Float gauge; values are stored as raw `f64` bits.
#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl GaugeVec {
    pub fn set(&self, labels: &[(&str, &str)], v: f64) {
        let gauge = self.map.entry(label_key(labels)).or_insert_with(|| AtomicU64::new(0));
        gauge.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Option<f64> {
        self.map
            .get(&label_key(labels))
            .map(|g| f64::from_bits(g.load(Ordering::Relaxed)))
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} gauge");
        for (key, val) in sorted(&self.map, |g| f64::from_bits(g.load(Ordering::Relaxed))) {
            let _ = writeln!(out, "{}{} {}", name, render_labels(&key), format_value(val));
        }
    }
}

// 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s, 5s, 10s
const BUCKETS_MICROS: [u64; 9] = [
    1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000, 5_000_000, 10_000_000,
];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; 9],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration and increment cumulative buckets (microsecond scale).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self.map.entry(label_key(labels)).or_insert_with(AtomicHistogram::default);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(micros, Ordering::Relaxed);

        for (i, &b) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} histogram");
        let rows = sorted(&self.map, |h| {
            let buckets: Vec<u64> = h.buckets.iter().map(|b| b.load(Ordering::Relaxed)).collect();
            (buckets, h.count.load(Ordering::Relaxed), h.sum.load(Ordering::Relaxed))
        });
        for (key, (buckets, count, sum)) in rows {
            let label_str = render_labels(&key);
            let inner = label_str.trim_start_matches('{').trim_end_matches('}');
            let prefix = if inner.is_empty() { String::new() } else { format!("{inner},") };

            for (le, n) in BUCKETS_MICROS.iter().zip(&buckets) {
                let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"{le}\"}} {n}");
            }
            let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"+Inf\"}} {count}");
            let _ = writeln!(out, "{name}_sum{label_str} {sum}");
            let _ = writeln!(out, "{name}_count{label_str} {count}");
        }
    }
}

/// Process-owned self metrics, constructed once at startup and shared by
/// refresh tasks and the collector registry.
#[derive(Default)]
pub struct ExporterMetrics {
    pub refresh_total: CounterVec,
    pub refresh_duration: HistogramVec, // In Microseconds
    pub last_success: GaugeVec,
    pub collect_errors: CounterVec,
}

impl ExporterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one refresh cycle. `outcome` is `"ok"` or an error kind.
    pub fn record_refresh(&self, source: &str, outcome: &str, elapsed: Duration) {
        self.refresh_total.inc(&[("source", source), ("outcome", outcome)]);
        self.refresh_duration.observe(&[("source", source)], elapsed);
        if outcome == "ok" {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);
            self.last_success.set(&[("source", source)], now);
        }
    }

    pub fn record_collect_error(&self, collector: &str) {
        self.collect_errors.inc(&[("collector", collector)]);
    }

    /// Render all self metrics in text exposition format.
    pub fn render(&self, out: &mut String) {
        self.refresh_total
            .render("homeprom_refresh_total", "Refresh cycles by source and outcome.", out);
        self.refresh_duration.render(
            "homeprom_refresh_duration_micros",
            "Upstream fetch duration per refresh cycle, in microseconds.",
            out,
        );
        self.last_success.render(
            "homeprom_last_refresh_success_timestamp_seconds",
            "Unix time of the last successful refresh.",
            out,
        );
        self.collect_errors.render(
            "homeprom_collect_errors_total",
            "Collectors that failed and were skipped during a scrape.",
            out,
        );
    }
}
