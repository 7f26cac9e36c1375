//! In-process metric registry for the service.
//!
//! Counter/gauge/histogram families with dynamic labels backed by `DashMap`.
//! Labels are flattened into sorted key vectors so rendering is deterministic.
//! Histogram observations are accumulated in whole microseconds and rendered in
//! seconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

type LabelKey = Vec<(String, String)>;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// `name{labels}` or bare `name` when there are no labels.
fn series(name: &str, labels: &str) -> String {
    if labels.is_empty() {
        name.to_string()
    } else {
        format!("{name}{{{labels}}}")
    }
}

/// Prometheus spelling of a sample value.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf".into() } else { "-Inf".into() }
    } else {
        v.to_string()
    }
}

fn header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help.replace('\\', "\\\\").replace('\n', "\\n"));
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Snapshot of a family map sorted by label key.
fn sorted<V, T>(map: &DashMap<LabelKey, V>, read: impl Fn(&V) -> T) -> Vec<(LabelKey, T)> {
    let mut rows: Vec<(LabelKey, T)> = map
        .iter()
        .map(|r| (r.key().clone(), read(r.value())))
        .collect();
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
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for a label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "counter");
        for (key, val) in sorted(&self.map, |c| c.load(Ordering::Relaxed)) {
            let _ = writeln!(out, "{} {}", series(name, &label_str(&key)), val);
        }
    }
}

/// Float gauge family. Values are stored as `f64` bit patterns.
#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl GaugeVec {
    /// Overwrite the value.
    pub fn set(&self, labels: &[(&str, &str)], v: f64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0f64.to_bits()));
        gauge.store(v.to_bits(), Ordering::Relaxed);
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) { self.add(labels, 1.0); }
    /// Decrement by 1.
    pub fn dec(&self, labels: &[(&str, &str)]) { self.add(labels, -1.0); }

    /// Add an arbitrary signed delta.
    pub fn add(&self, labels: &[(&str, &str)], v: f64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0f64.to_bits()));
        let _ = gauge.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
            Some((f64::from_bits(bits) + v).to_bits())
        });
    }

    /// Current value for a label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> f64 {
        self.map
            .get(&label_key(labels))
            .map(|g| f64::from_bits(g.load(Ordering::Relaxed)))
            .unwrap_or(0.0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "gauge");
        for (key, bits) in sorted(&self.map, |g| g.load(Ordering::Relaxed)) {
            let _ = writeln!(
                out,
                "{} {}",
                series(name, &label_str(&key)),
                format_value(f64::from_bits(bits))
            );
        }
    }
}

// Prometheus default buckets, in microseconds.
// 5ms, 10ms, 25ms, 50ms, 75ms, 100ms, 250ms, 500ms, 750ms, 1s, 2.5s, 5s, 7.5s, 10s
const BUCKETS_MICROS: [u64; 14] = [
    5_000, 10_000, 25_000, 50_000, 75_000, 100_000, 250_000, 500_000, 750_000,
    1_000_000, 2_500_000, 5_000_000, 7_500_000, 10_000_000,
];

struct AtomicHistogram {
    count: AtomicU64,
    sum_micros: AtomicU64,
    buckets: [AtomicU64; BUCKETS_MICROS.len()],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

struct HistogramSnapshot {
    count: u64,
    sum_micros: u64,
    buckets: [u64; BUCKETS_MICROS.len()],
}

impl AtomicHistogram {
    fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            count: self.count.load(Ordering::Relaxed),
            sum_micros: self.sum_micros.load(Ordering::Relaxed),
            buckets: std::array::from_fn(|i| self.buckets[i].load(Ordering::Relaxed)),
        }
    }
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Create the series for a label set without observing anything, so it
    /// renders as zero before the first observation.
    pub fn ensure(&self, labels: &[(&str, &str)]) {
        self.map.entry(label_key(labels)).or_insert_with(AtomicHistogram::default);
    }

    /// Observe a duration and increment cumulative buckets.
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self.map.entry(label_key(labels)).or_insert_with(AtomicHistogram::default);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_micros.fetch_add(micros, Ordering::Relaxed);

        // Cumulative: every bucket whose bound covers the value.
        for (i, &b) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of observations for a label set.
    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format (unit: seconds).
    fn render(&self, name: &str, help: &str, out: &mut String) {
        header(out, name, help, "histogram");
        for (key, snap) in sorted(&self.map, AtomicHistogram::snapshot) {
            let labels = label_str(&key);
            let prefix = if labels.is_empty() { String::new() } else { format!("{labels},") };

            for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
                let le = format_value(le as f64 / 1_000_000.0);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", name, prefix, le, snap.buckets[i]);
            }
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, snap.count);
            let sum = format_value(snap.sum_micros as f64 / 1_000_000.0);
            let _ = writeln!(out, "{} {}", series(&format!("{name}_sum"), &labels), sum);
            let _ = writeln!(out, "{} {}", series(&format!("{name}_count"), &labels), snap.count);
        }
    }
}

pub const REQUESTS_TOTAL: &str = "app_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "app_request_duration_seconds";
pub const ACTIVE_CONNECTIONS: &str = "app_active_connections";
pub const CPU_USAGE_PERCENT: &str = "app_cpu_usage_percent";
pub const MEMORY_USAGE_BYTES: &str = "app_memory_usage_bytes";

/// Registry of every metric the service exposes.
pub struct ServiceMetrics {
    /// Labels: `method`, `endpoint`.
    pub requests: CounterVec,
    pub request_duration: HistogramVec,
    /// Synthetic: `request_count % 100`, not a real connection count.
    pub active_connections: GaugeVec,
    pub cpu_usage: GaugeVec,
    pub memory_usage: GaugeVec,
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    pub fn new() -> Self {
        let m = Self {
            requests: CounterVec::default(),
            request_duration: HistogramVec::default(),
            active_connections: GaugeVec::default(),
            cpu_usage: GaugeVec::default(),
            memory_usage: GaugeVec::default(),
        };
        // Unlabelled families expose a zero sample from the start.
        m.request_duration.ensure(&[]);
        m.active_connections.set(&[], 0.0);
        m.cpu_usage.set(&[], 0.0);
        m.memory_usage.set(&[], 0.0);
        m
    }

    /// Count one inbound request.
    pub fn record_request(&self, method: &str, endpoint: &str) {
        self.requests.inc(&[("method", method), ("endpoint", endpoint)]);
    }

    /// Record how long a request took end to end.
    pub fn observe_duration(&self, elapsed: Duration) {
        self.request_duration.observe(&[], elapsed);
    }

    /// Store a fresh CPU/memory sample.
    pub fn set_system(&self, cpu_percent: f64, memory_used_bytes: u64) {
        self.cpu_usage.set(&[], cpu_percent);
        self.memory_usage.set(&[], memory_used_bytes as f64);
    }

    pub fn set_active_connections(&self, v: u64) {
        self.active_connections.set(&[], v as f64);
    }

    /// Render every family in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.requests.render(REQUESTS_TOTAL, "Total app requests", &mut out);
        self.request_duration.render(REQUEST_DURATION_SECONDS, "Request duration", &mut out);
        self.active_connections.render(ACTIVE_CONNECTIONS, "Active connections", &mut out);
        self.cpu_usage.render(CPU_USAGE_PERCENT, "CPU usage percentage", &mut out);
        self.memory_usage.render(MEMORY_USAGE_BYTES, "Memory usage in bytes", &mut out);
        out
    }
}
