//! Shared counters and metrics for stress runs.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counters shared between producer and consumer threads during a stress run
pub struct StressCounters {
    pub produced: AtomicU64,
    pub delivered: AtomicU64,
    pub rejected: AtomicU64,
    pub corrupt: AtomicU64,
    pub running: AtomicBool,
}

impl StressCounters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_corrupt(&self) {
        self.corrupt.fetch_add(1, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn snapshot(&self, duration: Duration) -> StressMetrics {
        StressMetrics {
            produced: self.produced.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            corrupt: self.corrupt.load(Ordering::Relaxed),
            duration,
        }
    }
}

impl Default for StressCounters {
    fn default() -> Self {
        Self {
            produced: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            corrupt: AtomicU64::new(0),
            running: AtomicBool::new(true),
        }
    }
}

/// Metrics collected during a stress run
#[derive(Debug, Clone)]
pub struct StressMetrics {
    pub produced: u64,
    pub delivered: u64,
    pub rejected: u64,
    pub corrupt: u64,
    pub duration: Duration,
}

impl StressMetrics {
    pub fn produce_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.produced as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn deliver_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.delivered as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Fraction of produced values the consumer never saw. Expected to be
    /// nonzero whenever the producer outruns the consumer.
    pub fn skip_rate(&self) -> f64 {
        if self.produced > 0 {
            1.0 - (self.delivered as f64 / self.produced as f64)
        } else {
            0.0
        }
    }
}
