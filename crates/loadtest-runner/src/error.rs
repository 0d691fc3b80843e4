//! Error types for the workload runner.

use std::time::Duration;

/// Error returned by a [`WorkloadDatabase`](crate::WorkloadDatabase) call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DatabaseError {
    /// The call did not finish within the soft timeout
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Error reported by the database driver
    #[error("Driver error: {0}")]
    Driver(String),

    /// Error starting, committing or aborting a transaction
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// The database refused the operation
    #[error("Operation rejected: {0}")]
    Rejected(String),
}

/// Error type for running a workload.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Invalid configuration, detected before any worker starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// Seeding a collection failed
    #[error("Seeding {namespace} failed: {source}")]
    Seed {
        namespace: String,
        #[source]
        source: DatabaseError,
    },

    /// A worker task panicked or was cancelled by the runtime
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// Database error outside the per-operation path
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
