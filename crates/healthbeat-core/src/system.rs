//! System-metrics probe.
//!
//! The service only needs two numbers from the host: CPU utilisation and used
//! memory. `SystemProbe` is the seam; `SysinfoProbe` reads the real host and
//! `StaticProbe` returns fixed values.

use parking_lot::Mutex;
use sysinfo::System;

pub trait SystemProbe: Send + Sync {
    /// Global CPU utilisation in `[0, 100]`.
    fn cpu_percent(&self) -> f64;
    /// Physical memory currently in use, in bytes.
    fn memory_used_bytes(&self) -> u64;
}

/// Host probe backed by `sysinfo`.
///
/// CPU usage is computed between two refreshes, so each call reports the
/// utilisation since the previous call. The very first reading may be 0.
pub struct SysinfoProbe {
    sys: Mutex<System>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        // Prime the CPU baseline.
        sys.refresh_cpu();
        tracing::debug!(cpus = sys.cpus().len(), "sysinfo probe initialised");
        Self { sys: Mutex::new(sys) }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for SysinfoProbe {
    fn cpu_percent(&self) -> f64 {
        let mut sys = self.sys.lock();
        sys.refresh_cpu();
        clamp_percent(f64::from(sys.global_cpu_info().cpu_usage()))
    }

    fn memory_used_bytes(&self) -> u64 {
        let mut sys = self.sys.lock();
        sys.refresh_memory();
        sys.used_memory()
    }
}

/// Probe returning fixed values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProbe {
    pub cpu_percent: f64,
    pub memory_used_bytes: u64,
}

impl StaticProbe {
    pub fn new(cpu_percent: f64, memory_used_bytes: u64) -> Self {
        Self { cpu_percent, memory_used_bytes }
    }
}

impl SystemProbe for StaticProbe {
    fn cpu_percent(&self) -> f64 {
        clamp_percent(self.cpu_percent)
    }

    fn memory_used_bytes(&self) -> u64 {
        self.memory_used_bytes
    }
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 100.0)
    }
}
