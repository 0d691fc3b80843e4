//! Workload execution engine for mongo-workload.
//!
//! Drives a weighted mix of operations against a [`WorkloadDatabase`]
//! from a pool of concurrent workers and collects latency statistics.
//!
//! # Architecture
//!
//! ```text
//!   RunConfig + Workload (collections, templates)
//!          │
//!          ▼
//! ┌──────────────────────────────────────────────┐
//! │ run_workload                                 │
//! │                                              │
//! │  producers ──► DocumentBuffer                │
//! │                    │                         │
//! │  workers: select ─► materialize ─► execute ──┼──► WorkloadDatabase
//! │             │                        │       │
//! │             └─ transaction block ────┤       │
//! │                                      ▼       │
//! │  reporter ◄──────────────── StatsCollector   │
//! └──────────────────────────────────────────────┘
//!          │
//!          ▼
//!     RunSummary + printed summary
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use loadtest_generator::{DocumentGenerator, ProviderRegistry};
//! use loadtest_runner::{run_workload, CollectionTarget, MemoryDatabase, RunConfig, Workload};
//! use tokio_util::sync::CancellationToken;
//! use workload_core::{normalize, CollectionSpec, OperationRatios};
//!
//! # tokio_test::block_on(async {
//! let generator = DocumentGenerator::new(
//!     CollectionSpec::new("app", "users"),
//!     Arc::new(ProviderRegistry::builtin()),
//! );
//! let workload = Workload::new(vec![CollectionTarget::new(generator)], Vec::new()).unwrap();
//! let config = RunConfig::new(normalize(&OperationRatios::zero(), false))
//!     .with_duration(Duration::ZERO);
//!
//! let db = Arc::new(MemoryDatabase::new());
//! let summary = run_workload(db, workload, config, CancellationToken::new()).await.unwrap();
//! assert_eq!(summary.stats.total_ops(), 0);
//! # });
//! ```

pub mod buffer;
pub mod config;
pub mod database;
pub mod error;
mod fixed;
pub mod materialize;
pub mod pool;
pub mod seed;
pub mod selector;
pub mod testing;
pub mod transaction;
pub mod workload;

// Re-exports for convenience
pub use buffer::DocumentBuffer;
pub use config::RunConfig;
pub use database::{Namespace, Operation, OperationOutcome, TransactionSession, WorkloadDatabase};
pub use error::{DatabaseError, Result, RunnerError};
pub use materialize::{substitute_placeholders, Materializer};
pub use pool::{run_workload, RunContext, RunPhase, RunSummary};
pub use seed::{seed_collections, SeedMetrics, DEFAULT_SEED_BATCH_SIZE};
pub use selector::{select_operation, SINGLE_DOCUMENT_WRITE_PERCENT};
pub use testing::MemoryDatabase;
pub use transaction::{execute_transaction, run_transaction};
pub use workload::{CollectionTarget, Workload};
