//! Application configuration.
//!
//! Settings come from a YAML file and are then overridden by [`RunOpts`]
//! (flags and `PLGM_*` environment variables). Missing or zero values are
//! replaced with defaults before the engine configuration is built.

mod duration;

pub use duration::parse_duration;

use crate::RunOpts;
use anyhow::Context;
use loadtest_mongodb::CallPolicy;
use loadtest_runner::config as engine;
use loadtest_runner::{RunConfig, DEFAULT_SEED_BATCH_SIZE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use workload_core::{OperationDistribution, OperationRatios, Ratio};

/// File loaded when no `--config` is given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DURATION: &str = "60s";
pub const DEFAULT_STATUS_REFRESH_RATE_SEC: u64 = 1;
pub const DEFAULT_OP_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 5;

/// YAML configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub uri: String,

    /// Use the built-in flights collection and queries
    pub default_workload: bool,
    pub collections_path: Option<PathBuf>,
    pub queries_path: Option<PathBuf>,

    pub skip_seed: bool,
    pub documents_count: u64,
    pub seed_batch_size: usize,

    pub concurrency: usize,
    pub duration: String,

    // Operation mix
    pub find_percent: i64,
    pub update_percent: i64,
    pub delete_percent: i64,
    pub insert_percent: i64,
    pub bulk_insert_percent: i64,
    pub aggregate_percent: i64,
    pub transaction_percent: i64,

    pub use_transactions: bool,
    pub max_transaction_ops: usize,

    // Runtime tuning
    pub find_batch_size: u32,
    pub find_limit: i64,
    pub use_find_one_for_limit_one: bool,
    pub insert_batch_size: usize,
    pub insert_cache_size: usize,
    pub status_refresh_rate_sec: u64,
    pub op_timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,

    pub debug_mode: bool,
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            default_workload: false,
            collections_path: None,
            queries_path: None,
            skip_seed: false,
            documents_count: 10_000,
            seed_batch_size: DEFAULT_SEED_BATCH_SIZE,
            concurrency: engine::DEFAULT_CONCURRENCY,
            duration: DEFAULT_DURATION.to_string(),
            find_percent: 50,
            update_percent: 20,
            delete_percent: 10,
            insert_percent: 10,
            bulk_insert_percent: 0,
            aggregate_percent: 5,
            transaction_percent: 5,
            use_transactions: false,
            max_transaction_ops: engine::DEFAULT_MAX_TRANSACTION_OPS,
            find_batch_size: engine::DEFAULT_FIND_BATCH_SIZE,
            find_limit: engine::DEFAULT_FIND_LIMIT,
            use_find_one_for_limit_one: true,
            insert_batch_size: engine::DEFAULT_INSERT_BATCH_SIZE,
            insert_cache_size: engine::DEFAULT_INSERT_CACHE_SIZE,
            status_refresh_rate_sec: DEFAULT_STATUS_REFRESH_RATE_SEC,
            op_timeout_ms: DEFAULT_OP_TIMEOUT_MS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            debug_mode: false,
            seed: None,
        }
    }
}

impl AppConfig {
    /// Parse a YAML configuration file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid YAML in config file {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load `path`, or `config.yaml` when present, or the built-in defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    debug!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply flag and environment overrides (everything except percentages,
    /// see [`AppConfig::ratios`]).
    pub fn apply_opts(&mut self, opts: &RunOpts) {
        if let Some(uri) = &opts.uri {
            self.uri = uri.clone();
        }
        if let Some(default_workload) = opts.default_workload {
            self.default_workload = default_workload;
        }

        // Custom paths imply a custom workload
        if let Some(path) = &opts.collections_path {
            self.collections_path = Some(path.clone());
            self.default_workload = false;
        }
        if let Some(path) = &opts.queries_path {
            self.queries_path = Some(path.clone());
            self.default_workload = false;
        }

        if let Some(v) = opts.concurrency {
            self.concurrency = v;
        }
        if let Some(v) = &opts.duration {
            self.duration = v.clone();
        }
        if let Some(v) = opts.documents_count {
            self.documents_count = v;
        }
        if let Some(v) = opts.skip_seed {
            self.skip_seed = v;
        }
        if let Some(v) = opts.use_transactions {
            self.use_transactions = v;
        }
        if let Some(v) = opts.max_transaction_ops {
            self.max_transaction_ops = v;
        }
        if let Some(v) = opts.find_batch_size {
            self.find_batch_size = v;
        }
        if let Some(v) = opts.find_limit {
            self.find_limit = v;
        }
        if let Some(v) = opts.insert_cache_size {
            self.insert_cache_size = v;
        }
        if let Some(v) = opts.op_timeout_ms {
            self.op_timeout_ms = v;
        }
        if let Some(v) = opts.retry_attempts {
            self.retry_attempts = v;
        }
        if let Some(v) = opts.retry_backoff_ms {
            self.retry_backoff_ms = v;
        }
        if let Some(v) = opts.status_refresh_rate_sec {
            self.status_refresh_rate_sec = v;
        }
        if opts.seed.is_some() {
            self.seed = opts.seed;
        }
        if opts.debug {
            self.debug_mode = true;
        }
    }

    /// Replace zero values with defaults.
    ///
    /// `insert_cache_size` is left alone: zero disables pre-generation.
    pub fn apply_defaults(&mut self) {
        if self.uri.trim().is_empty() {
            self.uri = DEFAULT_URI.to_string();
        }
        if self.duration.trim().is_empty() {
            self.duration = DEFAULT_DURATION.to_string();
        }
        if self.concurrency == 0 {
            self.concurrency = engine::DEFAULT_CONCURRENCY;
        }
        if self.seed_batch_size == 0 {
            self.seed_batch_size = DEFAULT_SEED_BATCH_SIZE;
        }
        if self.max_transaction_ops == 0 {
            self.max_transaction_ops = engine::DEFAULT_MAX_TRANSACTION_OPS;
        }
        if self.find_batch_size == 0 {
            self.find_batch_size = engine::DEFAULT_FIND_BATCH_SIZE;
        }
        if self.find_limit <= 0 {
            self.find_limit = engine::DEFAULT_FIND_LIMIT;
        }
        if self.insert_batch_size == 0 {
            self.insert_batch_size = engine::DEFAULT_INSERT_BATCH_SIZE;
        }
        if self.status_refresh_rate_sec == 0 {
            self.status_refresh_rate_sec = DEFAULT_STATUS_REFRESH_RATE_SEC;
        }
        if self.op_timeout_ms == 0 {
            self.op_timeout_ms = DEFAULT_OP_TIMEOUT_MS;
        }
        if self.retry_attempts == 0 {
            self.retry_attempts = DEFAULT_RETRY_ATTEMPTS;
        }
        if self.retry_backoff_ms == 0 {
            self.retry_backoff_ms = DEFAULT_RETRY_BACKOFF_MS;
        }
    }

    /// Raw ratios: file values are defaults, flag/env values are pinned.
    pub fn ratios(&self, opts: &RunOpts) -> OperationRatios {
        let ratio = |pinned: Option<i64>, file: i64| match pinned {
            Some(v) => Ratio::Pinned(v),
            None => Ratio::Default(file),
        };
        OperationRatios {
            find: ratio(opts.find_percent, self.find_percent),
            update: ratio(opts.update_percent, self.update_percent),
            delete: ratio(opts.delete_percent, self.delete_percent),
            insert: ratio(opts.insert_percent, self.insert_percent),
            bulk_insert: ratio(opts.bulk_insert_percent, self.bulk_insert_percent),
            aggregate: ratio(opts.aggregate_percent, self.aggregate_percent),
            transaction: ratio(opts.transaction_percent, self.transaction_percent),
        }
    }

    /// Whether the built-in flights workload is used.
    pub fn uses_default_workload(&self) -> bool {
        self.default_workload || self.collections_path.is_none()
    }

    /// Build the engine configuration.
    pub fn run_config(&self, distribution: OperationDistribution) -> anyhow::Result<RunConfig> {
        let duration = parse_duration(&self.duration)
            .with_context(|| format!("Invalid duration '{}'", self.duration))?;

        Ok(RunConfig::new(distribution)
            .with_concurrency(self.concurrency)
            .with_duration(duration)
            .with_transactions(self.use_transactions, self.max_transaction_ops)
            .with_find_options(
                self.find_limit,
                self.find_batch_size,
                self.use_find_one_for_limit_one,
            )
            .with_insert_batch_size(self.insert_batch_size)
            .with_insert_cache_size(self.insert_cache_size)
            .with_status_interval(Duration::from_secs(self.status_refresh_rate_sec))
            .with_seed(self.seed))
    }

    /// Timeout and retry policy for the MongoDB handle.
    pub fn call_policy(&self) -> CallPolicy {
        CallPolicy {
            op_timeout: Duration::from_millis(self.op_timeout_ms),
            retry_attempts: self.retry_attempts,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workload_core::{normalize, OperationBucket};

    #[test]
    fn test_parse_yaml_with_defaults() {
        let config = AppConfig::from_yaml_str(
            r#"
uri: "mongodb://db.example.com:27017"
concurrency: 16
duration: "5m"
find_percent: 70
update_percent: 30
delete_percent: 0
insert_percent: 0
aggregate_percent: 0
transaction_percent: 0
collections_path: "./collections"
"#,
        )
        .unwrap();

        assert_eq!(config.uri, "mongodb://db.example.com:27017");
        assert_eq!(config.concurrency, 16);
        assert_eq!(config.find_percent, 70);
        assert_eq!(config.collections_path, Some(PathBuf::from("./collections")));
        // Unset keys keep their defaults
        assert_eq!(config.find_limit, 5);
        assert_eq!(config.insert_cache_size, 1000);
        assert_eq!(config.op_timeout_ms, 500);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(AppConfig::from_yaml_str("concurrency: [1, 2").is_err());
        assert!(AppConfig::from_yaml_str("concurrency: many").is_err());
    }

    #[test]
    fn test_apply_defaults_replaces_zeroes() {
        let mut config = AppConfig {
            concurrency: 0,
            find_batch_size: 0,
            find_limit: -1,
            insert_batch_size: 0,
            insert_cache_size: 0,
            status_refresh_rate_sec: 0,
            op_timeout_ms: 0,
            retry_attempts: 0,
            retry_backoff_ms: 0,
            duration: String::new(),
            ..AppConfig::default()
        };
        config.apply_defaults();

        assert_eq!(config.concurrency, 4);
        assert_eq!(config.find_batch_size, 10);
        assert_eq!(config.find_limit, 5);
        assert_eq!(config.insert_batch_size, 10);
        assert_eq!(config.status_refresh_rate_sec, 1);
        assert_eq!(config.op_timeout_ms, 500);
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.retry_backoff_ms, 5);
        assert_eq!(config.duration, "60s");
        // Zero cache disables the producer rather than defaulting
        assert_eq!(config.insert_cache_size, 0);
    }

    #[test]
    fn test_opts_override_file() {
        let mut config = AppConfig::default();
        let opts = RunOpts {
            uri: Some("mongodb://other:27017".to_string()),
            concurrency: Some(32),
            duration: Some("10s".to_string()),
            collections_path: Some(PathBuf::from("/tmp/collections")),
            debug: true,
            ..RunOpts::default()
        };
        config.apply_opts(&opts);

        assert_eq!(config.uri, "mongodb://other:27017");
        assert_eq!(config.concurrency, 32);
        assert_eq!(config.duration, "10s");
        assert!(!config.default_workload);
        assert!(!config.uses_default_workload());
        assert!(config.debug_mode);
    }

    #[test]
    fn test_flag_percentages_are_pinned() {
        let config = AppConfig::default();
        let opts = RunOpts {
            find_percent: Some(80),
            ..RunOpts::default()
        };
        let ratios = config.ratios(&opts);

        assert_eq!(ratios.find, Ratio::Pinned(80));
        assert_eq!(ratios.update, Ratio::Default(20));

        let distribution = normalize(&ratios, false);
        assert_eq!(distribution.total(), 100);
        // 20 left for update/delete/insert/aggregate (45 total), truncation goes to find
        assert_eq!(distribution.get(OperationBucket::Update), 8);
        assert_eq!(distribution.get(OperationBucket::Aggregate), 2);
        assert_eq!(distribution.get(OperationBucket::Find), 82);
        assert_eq!(distribution.get(OperationBucket::Transaction), 0);
    }

    #[test]
    fn test_run_config() {
        let config = AppConfig {
            duration: "1h30m".to_string(),
            seed: Some(9),
            ..AppConfig::default()
        };
        let distribution = normalize(&config.ratios(&RunOpts::default()), false);
        let run = config.run_config(distribution).unwrap();

        assert_eq!(run.duration, Duration::from_secs(5400));
        assert_eq!(run.concurrency, 4);
        assert_eq!(run.seed, Some(9));
        assert_eq!(run.status_interval, Duration::from_secs(1));
        assert!(run.validate().is_ok());

        let bad = AppConfig {
            duration: "soon".to_string(),
            ..AppConfig::default()
        };
        assert!(bad.run_config(distribution).is_err());
    }

    #[test]
    fn test_call_policy() {
        let policy = AppConfig::default().call_policy();
        assert_eq!(policy, CallPolicy::default());
    }
}
