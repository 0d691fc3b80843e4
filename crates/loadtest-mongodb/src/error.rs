//! Error types for the MongoDB database handle.

use loadtest_runner::DatabaseError;
use thiserror::Error;

/// Errors that can occur talking to MongoDB.
#[derive(Error, Debug)]
pub enum MongoWorkloadError {
    /// MongoDB connection or query error.
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<MongoWorkloadError> for DatabaseError {
    fn from(e: MongoWorkloadError) -> Self {
        DatabaseError::Driver(e.to_string())
    }
}
