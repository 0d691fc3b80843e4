//! Per-operation-kind counters and histograms.

use crate::histogram::{HistogramSnapshot, LatencyHistogram};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use workload_core::OperationKind;

const KINDS: usize = OperationKind::ALL.len();

/// Thread-safe statistics for a workload run.
///
/// Completed-operation and failure counters are plain atomics so the hot
/// path never takes a lock for them; only the histogram of the recorded
/// kind is locked.
#[derive(Debug)]
pub struct StatsCollector {
    started: Instant,
    ops: [AtomicU64; KINDS],
    failures: [AtomicU64; KINDS],
    histograms: [LatencyHistogram; KINDS],
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            ops: std::array::from_fn(|_| AtomicU64::new(0)),
            failures: std::array::from_fn(|_| AtomicU64::new(0)),
            histograms: std::array::from_fn(|_| LatencyHistogram::new()),
        }
    }

    /// Record a successful operation.
    pub fn record(&self, kind: OperationKind, elapsed: Duration) {
        let i = kind.index();
        self.ops[i].fetch_add(1, Ordering::Relaxed);
        self.histograms[i].record(elapsed);
    }

    /// Count a failed operation. Failures are never recorded as latency.
    pub fn record_failure(&self, kind: OperationKind) {
        self.failures[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn ops(&self, kind: OperationKind) -> u64 {
        self.ops[kind.index()].load(Ordering::Relaxed)
    }

    pub fn failures(&self, kind: OperationKind) -> u64 {
        self.failures[kind.index()].load(Ordering::Relaxed)
    }

    pub fn total_ops(&self) -> u64 {
        self.ops.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Time since the collector was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn histogram(&self, kind: OperationKind) -> &LatencyHistogram {
        &self.histograms[kind.index()]
    }

    pub fn histogram_snapshot(&self, kind: OperationKind) -> HistogramSnapshot {
        self.histograms[kind.index()].snapshot()
    }

    /// Snapshot of the completed-operation counters.
    pub fn counters(&self) -> CounterSnapshot {
        CounterSnapshot {
            elapsed: self.elapsed(),
            ops: std::array::from_fn(|i| self.ops[i].load(Ordering::Relaxed)),
        }
    }
}

/// Completed-operation counts at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub elapsed: Duration,
    ops: [u64; KINDS],
}

impl CounterSnapshot {
    /// A snapshot with every counter at zero.
    pub fn zero() -> Self {
        Self {
            elapsed: Duration::ZERO,
            ops: [0; KINDS],
        }
    }

    pub fn get(&self, kind: OperationKind) -> u64 {
        self.ops[kind.index()]
    }

    pub fn total(&self) -> u64 {
        self.ops.iter().sum()
    }

    /// Per-kind counts since `previous`.
    pub fn delta(&self, previous: &CounterSnapshot) -> CounterSnapshot {
        CounterSnapshot {
            elapsed: self.elapsed,
            ops: std::array::from_fn(|i| self.ops[i].saturating_sub(previous.ops[i])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_updates_counters_and_histogram() {
        let stats = StatsCollector::new();
        stats.record(OperationKind::Find, Duration::from_millis(3));
        stats.record(OperationKind::Find, Duration::from_millis(5));
        stats.record(OperationKind::UpdateOne, Duration::from_millis(7));

        assert_eq!(stats.ops(OperationKind::Find), 2);
        assert_eq!(stats.ops(OperationKind::UpdateOne), 1);
        assert_eq!(stats.total_ops(), 3);
        assert_eq!(stats.histogram(OperationKind::Find).count(), 2);
        assert_eq!(stats.histogram(OperationKind::DeleteOne).count(), 0);

        let find = stats.histogram_snapshot(OperationKind::Find);
        assert!((find.sum_ms - 8.0).abs() < 1e-6);
        assert!((find.mean_ms() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_failures_are_not_latency() {
        let stats = StatsCollector::new();
        stats.record_failure(OperationKind::InsertOne);
        stats.record_failure(OperationKind::Transaction);

        assert_eq!(stats.total_failures(), 2);
        assert_eq!(stats.total_ops(), 0);
        assert_eq!(stats.histogram(OperationKind::InsertOne).count(), 0);
    }

    #[test]
    fn test_counter_delta() {
        let stats = StatsCollector::new();
        stats.record(OperationKind::Find, Duration::from_millis(1));
        let first = stats.counters();

        stats.record(OperationKind::Find, Duration::from_millis(1));
        stats.record(OperationKind::Aggregate, Duration::from_millis(1));
        let second = stats.counters();

        let delta = second.delta(&first);
        assert_eq!(delta.get(OperationKind::Find), 1);
        assert_eq!(delta.get(OperationKind::Aggregate), 1);
        assert_eq!(delta.total(), 2);
        assert_eq!(first.delta(&CounterSnapshot::zero()).total(), 1);
    }

    #[test]
    fn test_concurrent_recording() {
        let stats = Arc::new(StatsCollector::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        stats.record(OperationKind::InsertOne, Duration::from_micros(500));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.ops(OperationKind::InsertOne), 8_000);
        assert_eq!(stats.histogram(OperationKind::InsertOne).count(), 8_000);
    }
}
