//! Latency histograms and throughput reporting for mongo-workload.
//!
//! - [`LatencyHistogram`] - 1ms-resolution histogram with percentile walk
//! - [`StatsCollector`] - lock-free per-kind counters plus one histogram per kind
//! - [`report`] - live status lines and the final summary table

pub mod collector;
pub mod histogram;
pub mod report;

// Re-exports for convenience
pub use collector::{CounterSnapshot, StatsCollector};
pub use histogram::{HistogramSnapshot, LatencyHistogram, MAX_LATENCY_BUCKET};
pub use report::{format_status_header, format_status_line, format_summary};
