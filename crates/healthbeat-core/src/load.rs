//! Synthetic CPU load.
//!
//! Blocking and CPU bound. Callers on an async runtime must run it on a
//! blocking worker (`tokio::task::spawn_blocking`).

use std::hint::black_box;
use std::time::{Duration, Instant};

/// Default length of one load burst.
pub const DEFAULT_LOAD_DURATION: Duration = Duration::from_secs(1);

/// Spin on arithmetic until `duration` of wall-clock time has passed.
///
/// The loop checks the clock between rounds, so the returned elapsed time is
/// always `>= duration` and overshoots by at most one round plus scheduling.
pub fn generate_load(duration: Duration) -> Duration {
    let start = Instant::now();
    let mut rounds: u64 = 0;
    while start.elapsed() < duration {
        black_box((0..1000u64).map(|i| i * i).sum::<u64>());
        rounds += 1;
    }
    let elapsed = start.elapsed();
    tracing::debug!(rounds, elapsed_ms = elapsed.as_millis() as u64, "load burst finished");
    elapsed
}
