//! mongo-workload library
//!
//! Configuration loading and wiring for the `mongo-workload` binary. The
//! engine itself lives in the workspace crates:
//!
//! - `workload_core` - value tree, schemas, query templates, ratio normalization
//! - `loadtest_generator` - schema-driven document generation
//! - `loadtest_stats` - latency histograms and reports
//! - `loadtest_runner` - selector, materializer, worker pool, transactions
//! - `loadtest_mongodb` - MongoDB implementation of the database seam
//!
//! # CLI Usage
//!
//! ```bash
//! # Built-in flights workload for one minute
//! mongo-workload run --uri mongodb://localhost:27017
//!
//! # Custom collections, 80% reads pinned, 5 minutes
//! mongo-workload run --config config.yaml \
//!   --collections-path ./collections --queries-path ./queries \
//!   --find-percent 80 --duration 5m
//!
//! # Check a configuration without a cluster
//! mongo-workload run --config config.yaml --dry-run
//! ```

use clap::Parser;
use std::path::PathBuf;

pub mod banner;
pub mod catalog;
pub mod config;

pub use catalog::Catalog;
pub use config::{parse_duration, AppConfig};

/// Command-line and environment overrides for a run.
///
/// Every option also reads a `PLGM_*` environment variable. Values given
/// here win over the YAML file, and percentages given here are pinned
/// during normalization.
#[derive(Parser, Clone, Debug, Default)]
pub struct RunOpts {
    /// YAML configuration file (defaults to ./config.yaml when present)
    #[arg(long, env = "PLGM_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// MongoDB connection URI
    #[arg(long, env = "PLGM_URI")]
    pub uri: Option<String>,

    /// Use the built-in flights workload
    #[arg(long, env = "PLGM_DEFAULT_WORKLOAD")]
    pub default_workload: Option<bool>,

    /// Collection definition file or directory
    #[arg(long, env = "PLGM_COLLECTIONS_PATH", value_name = "PATH")]
    pub collections_path: Option<PathBuf>,

    /// Query template file or directory
    #[arg(long, env = "PLGM_QUERIES_PATH", value_name = "PATH")]
    pub queries_path: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(long, env = "PLGM_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Run duration (e.g. 30s, 5m, 1h30m); 0 runs every query template once
    #[arg(long, env = "PLGM_DURATION")]
    pub duration: Option<String>,

    /// Documents inserted into each collection before the run
    #[arg(long, env = "PLGM_DOCUMENTS_COUNT")]
    pub documents_count: Option<u64>,

    /// Skip seeding
    #[arg(long, env = "PLGM_SKIP_SEED")]
    pub skip_seed: Option<bool>,

    #[arg(long, env = "PLGM_FIND_PERCENT")]
    pub find_percent: Option<i64>,

    #[arg(long, env = "PLGM_UPDATE_PERCENT")]
    pub update_percent: Option<i64>,

    #[arg(long, env = "PLGM_DELETE_PERCENT")]
    pub delete_percent: Option<i64>,

    #[arg(long, env = "PLGM_INSERT_PERCENT")]
    pub insert_percent: Option<i64>,

    #[arg(long, env = "PLGM_BULK_INSERT_PERCENT")]
    pub bulk_insert_percent: Option<i64>,

    #[arg(long, env = "PLGM_AGGREGATE_PERCENT")]
    pub aggregate_percent: Option<i64>,

    #[arg(long, env = "PLGM_TRANSACTION_PERCENT")]
    pub transaction_percent: Option<i64>,

    /// Enable multi-operation transactions
    #[arg(long, env = "PLGM_USE_TRANSACTIONS")]
    pub use_transactions: Option<bool>,

    /// Maximum operations grouped into one transaction
    #[arg(long, env = "PLGM_MAX_TRANSACTION_OPS")]
    pub max_transaction_ops: Option<usize>,

    /// Documents returned per cursor batch
    #[arg(long, env = "PLGM_FIND_BATCH_SIZE")]
    pub find_batch_size: Option<u32>,

    /// Default limit for find queries
    #[arg(long, env = "PLGM_FIND_LIMIT")]
    pub find_limit: Option<i64>,

    /// Pre-generated insert documents kept per collection (0 disables)
    #[arg(long, env = "PLGM_INSERT_CACHE_SIZE")]
    pub insert_cache_size: Option<usize>,

    /// Soft timeout per database call in milliseconds
    #[arg(long, env = "PLGM_OP_TIMEOUT_MS")]
    pub op_timeout_ms: Option<u64>,

    /// Retries after a failed database call
    #[arg(long, env = "PLGM_RETRY_ATTEMPTS")]
    pub retry_attempts: Option<u32>,

    /// Wait between retries in milliseconds
    #[arg(long, env = "PLGM_RETRY_BACKOFF_MS")]
    pub retry_backoff_ms: Option<u64>,

    /// Status line interval in seconds
    #[arg(long, env = "PLGM_STATUS_REFRESH_RATE_SEC")]
    pub status_refresh_rate_sec: Option<u64>,

    /// Base seed for reproducible runs
    #[arg(long, env = "PLGM_SEED")]
    pub seed: Option<u64>,

    /// Enable debug logging
    #[arg(long, env = "PLGM_DEBUG_MODE")]
    pub debug: bool,

    /// Run against an in-memory database instead of MongoDB
    #[arg(long)]
    pub dry_run: bool,
}
