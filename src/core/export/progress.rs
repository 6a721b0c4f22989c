//! Progress reporting
//!
//! The tracker is shared by reference between the concurrent date pre-pass
//! and the sequential export loop, so its state is atomics only.

use crate::log_progress;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counts finished units of work and logs at most once per interval
#[derive(Debug)]
pub struct ProgressTracker {
    stage: &'static str,
    total: usize,
    interval: Duration,
    started: Instant,
    done: AtomicUsize,

    /// Milliseconds since `started` of the last progress line
    last_log_ms: AtomicU64,
}

impl ProgressTracker {
    pub fn new(stage: &'static str, total: usize, interval: Duration) -> Self {
        Self {
            stage,
            total,
            interval,
            started: Instant::now(),
            done: AtomicUsize::new(0),
            last_log_ms: AtomicU64::new(0),
        }
    }

    /// Record one finished unit; returns the new count
    pub fn record(&self) -> usize {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        let elapsed = self.started.elapsed();

        if self.should_log(elapsed) {
            let remaining = estimate_remaining(elapsed, done, self.total);
            log_progress!(self.stage, done, self.total, remaining);
        }

        done
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Claim the next log slot if the interval has passed
    ///
    /// Only one caller wins when several finish in the same instant.
    fn should_log(&self, elapsed: Duration) -> bool {
        let now_ms = elapsed.as_millis() as u64;
        let last = self.last_log_ms.load(Ordering::SeqCst);

        if now_ms.saturating_sub(last) < self.interval.as_millis() as u64 {
            return false;
        }

        self.last_log_ms
            .compare_exchange(last, now_ms, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// `elapsed / done * (total - done)`, zero before the first unit completes
pub fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Duration {
    if done == 0 || done >= total {
        return Duration::ZERO;
    }
    elapsed.mul_f64((total - done) as f64 / done as f64)
}
