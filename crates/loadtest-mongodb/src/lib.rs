//! MongoDB database handle for the mongo-workload engine.
//!
//! Implements [`loadtest_runner::WorkloadDatabase`] on top of the official
//! driver. Every call outside a transaction gets a soft timeout and a
//! bounded number of retries with a fixed backoff; transactions run on a
//! driver session and are never retried.
//!
//! # Modules
//!
//! - [`forward`] - workload value tree → BSON conversion
//! - [`database`] - [`MongoDatabase`] and its transaction session

pub mod database;
pub mod error;
pub mod forward;

pub use database::{CallPolicy, MongoDatabase};
pub use error::MongoWorkloadError;
pub use forward::{to_bson_document, BsonValue};
