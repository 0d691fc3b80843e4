//! Fixed-resolution latency histogram.
//!
//! Samples are bucketed at 1ms resolution: bucket `i` holds samples in
//! `[i, i + 1)` milliseconds. Samples at or above [`MAX_LATENCY_BUCKET`]
//! only increment the overflow counter.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Number of 1ms buckets, and the value percentiles fall back to when
/// the target rank lies in the overflow.
pub const MAX_LATENCY_BUCKET: usize = 10_000;

#[derive(Debug, Clone)]
struct HistogramState {
    buckets: Vec<u64>,
    overflow: u64,
    count: u64,
    sum_ms: f64,
    min_ms: f64,
    max_ms: f64,
}

impl HistogramState {
    fn new() -> Self {
        Self {
            buckets: vec![0; MAX_LATENCY_BUCKET],
            overflow: 0,
            count: 0,
            sum_ms: 0.0,
            min_ms: f64::MAX,
            max_ms: 0.0,
        }
    }
}

/// Lock-protected latency histogram for one operation kind.
#[derive(Debug)]
pub struct LatencyHistogram {
    state: Mutex<HistogramState>,
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyHistogram {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HistogramState::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistogramState> {
        // Recover from poisoning
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record one sample.
    pub fn record(&self, elapsed: Duration) {
        self.record_millis(elapsed.as_secs_f64() * 1000.0);
    }

    /// Record one sample given in milliseconds. Negative values count as 0.
    pub fn record_millis(&self, ms: f64) {
        let ms = ms.max(0.0);
        let mut state = self.lock();
        state.count += 1;
        state.sum_ms += ms;
        if ms < state.min_ms {
            state.min_ms = ms;
        }
        if ms > state.max_ms {
            state.max_ms = ms;
        }

        let bucket = ms.floor() as usize;
        if bucket >= MAX_LATENCY_BUCKET {
            state.overflow += 1;
        } else {
            state.buckets[bucket] += 1;
        }
    }

    pub fn count(&self) -> u64 {
        self.lock().count
    }

    /// Approximate percentile in milliseconds; 0 when empty.
    pub fn percentile(&self, p: f64) -> f64 {
        self.snapshot().percentile(p)
    }

    /// Copy the current state for reporting.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let state = self.lock().clone();
        HistogramSnapshot {
            buckets: state.buckets,
            overflow: state.overflow,
            count: state.count,
            sum_ms: state.sum_ms,
            min_ms: if state.count == 0 { 0.0 } else { state.min_ms },
            max_ms: state.max_ms,
        }
    }
}

/// Point-in-time copy of a histogram.
#[derive(Debug, Clone)]
pub struct HistogramSnapshot {
    buckets: Vec<u64>,
    pub overflow: u64,
    pub count: u64,
    pub sum_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl HistogramSnapshot {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_ms / self.count as f64
        }
    }

    /// Walk the buckets until the running count reaches
    /// `ceil(p / 100 * count)` and return that bucket's lower bound.
    pub fn percentile(&self, p: f64) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let target = ((p.clamp(0.0, 100.0) / 100.0) * self.count as f64).ceil() as u64;
        let target = target.max(1);

        let mut running = 0;
        for (i, count) in self.buckets.iter().enumerate() {
            running += count;
            if running >= target {
                return i as f64;
            }
        }
        MAX_LATENCY_BUCKET as f64
    }
}
