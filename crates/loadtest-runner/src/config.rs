//! Engine configuration.

use crate::error::{Result, RunnerError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use workload_core::OperationDistribution;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_DURATION: Duration = Duration::from_secs(60);
pub const DEFAULT_FIND_BATCH_SIZE: u32 = 10;
pub const DEFAULT_FIND_LIMIT: i64 = 5;
pub const DEFAULT_INSERT_BATCH_SIZE: usize = 10;
pub const DEFAULT_INSERT_CACHE_SIZE: usize = 1000;
pub const DEFAULT_MAX_TRANSACTION_OPS: usize = 5;
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of concurrent workers
    pub concurrency: usize,

    /// Run length; zero runs every configured query once
    pub duration: Duration,

    /// Normalized operation percentages
    pub distribution: OperationDistribution,

    pub use_transactions: bool,

    /// Upper bound on operations per transaction (inclusive)
    pub max_transaction_ops: usize,

    /// Cursor batch size for finds
    pub find_batch_size: u32,

    /// Limit for finds whose template has none
    pub find_limit: i64,

    /// Use a single-document find when the effective limit is 1
    pub use_find_one_for_limit_one: bool,

    /// Documents per insertMany
    pub insert_batch_size: usize,

    /// Per-collection document buffer capacity; 0 disables the producer
    pub insert_cache_size: usize,

    /// Interval between live status lines
    pub status_interval: Duration,

    /// Print live status lines while running
    pub report_status: bool,

    /// Base seed for worker RNGs; entropy when absent
    pub seed: Option<u64>,
}

impl RunConfig {
    /// Create a configuration with default settings.
    pub fn new(distribution: OperationDistribution) -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            duration: DEFAULT_DURATION,
            distribution,
            use_transactions: false,
            max_transaction_ops: DEFAULT_MAX_TRANSACTION_OPS,
            find_batch_size: DEFAULT_FIND_BATCH_SIZE,
            find_limit: DEFAULT_FIND_LIMIT,
            use_find_one_for_limit_one: false,
            insert_batch_size: DEFAULT_INSERT_BATCH_SIZE,
            insert_cache_size: DEFAULT_INSERT_CACHE_SIZE,
            status_interval: DEFAULT_STATUS_INTERVAL,
            report_status: true,
            seed: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_transactions(mut self, enabled: bool, max_ops: usize) -> Self {
        self.use_transactions = enabled;
        self.max_transaction_ops = max_ops;
        self
    }

    pub fn with_insert_cache_size(mut self, size: usize) -> Self {
        self.insert_cache_size = size;
        self
    }

    pub fn with_insert_batch_size(mut self, size: usize) -> Self {
        self.insert_batch_size = size;
        self
    }

    pub fn with_find_options(mut self, limit: i64, batch_size: u32, find_one: bool) -> Self {
        self.find_limit = limit;
        self.find_batch_size = batch_size;
        self.use_find_one_for_limit_one = find_one;
        self
    }

    pub fn with_status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    pub fn with_report_status(mut self, enabled: bool) -> Self {
        self.report_status = enabled;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Independent RNG for one task. Streams are `seed + stream` when a
    /// seed is configured.
    pub fn rng_for(&self, stream: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_entropy(),
        }
    }

    /// True when the run executes each query once instead of for a duration.
    pub fn is_fixed_mode(&self) -> bool {
        self.duration.is_zero()
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(RunnerError::Config(
                "concurrency must be greater than 0".to_string(),
            ));
        }
        if self.distribution.total() != 100 {
            return Err(RunnerError::Config(format!(
                "operation distribution sums to {}, expected 100",
                self.distribution.total()
            )));
        }
        if self.status_interval.is_zero() {
            return Err(RunnerError::Config(
                "status interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
