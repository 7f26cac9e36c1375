//! Shared application state for the healthbeat service.
//!
//! One `AppState` per server instance. Cloning is cheap; every clone points at
//! the same counters and registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use healthbeat_core::metrics::ServiceMetrics;
use healthbeat_core::system::{SysinfoProbe, SystemProbe};

use crate::config::ServiceConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    probe: Arc<dyn SystemProbe>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    start_time: Instant,
    request_count: AtomicU64,
    metrics: ServiceMetrics,
}

impl AppState {
    /// Build state that samples the real host.
    pub fn new(cfg: ServiceConfig) -> Self {
        Self::with_probe(cfg, Arc::new(SysinfoProbe::new()))
    }

    pub fn with_probe(cfg: ServiceConfig, probe: Arc<dyn SystemProbe>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                start_time: Instant::now(),
                request_count: AtomicU64::new(0),
                metrics: ServiceMetrics::new(),
            }),
            probe,
        }
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.inner.metrics
    }

    pub fn probe(&self) -> Arc<dyn SystemProbe> {
        Arc::clone(&self.probe)
    }

    /// Time since the state was built. Monotonic.
    pub fn uptime(&self) -> Duration {
        self.inner.start_time.elapsed()
    }

    /// Count one inbound request and return the new total.
    pub fn record_request(&self) -> u64 {
        self.inner
            .request_count
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1)
    }

    pub fn request_count(&self) -> u64 {
        self.inner.request_count.load(Ordering::Relaxed)
    }

    /// Synthetic connection figure: `request_count % 100`.
    ///
    /// There is no real connection tracking behind it.
    pub fn active_connections(&self) -> u64 {
        self.request_count() % 100
    }

    /// Sample the probe into the CPU and memory gauges and return the sample.
    pub fn refresh_system_gauges(&self) -> (f64, u64) {
        let cpu = self.probe.cpu_percent();
        let mem = self.probe.memory_used_bytes();
        self.inner.metrics.set_system(cpu, mem);
        (cpu, mem)
    }
}
